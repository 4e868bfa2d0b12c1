//! Operations with no fallback: metadata, links, backend shutdown.

use std::time::SystemTime;

use super::SharedFs;
use crate::{Context, FileMode, FsError, Metadata};

/// Metadata of `name`.
pub fn stat(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<Metadata, FsError> {
    ctx.check("stat")?;
    match fsys.capabilities().stat() {
        Some(s) => s.stat(ctx, name),
        None => Err(FsError::not_supported("stat", name)),
    }
}

/// Set the permission bits of `name`.
pub fn chmod(ctx: &Context, fsys: &SharedFs, name: &str, mode: FileMode) -> Result<(), FsError> {
    ctx.check("chmod")?;
    match fsys.capabilities().chmod() {
        Some(c) => c.chmod(ctx, name, mode),
        None => Err(FsError::not_supported("chmod", name)),
    }
}

/// Set owner and group of `name`.
pub fn chown(ctx: &Context, fsys: &SharedFs, name: &str, uid: u32, gid: u32) -> Result<(), FsError> {
    ctx.check("chown")?;
    match fsys.capabilities().chown() {
        Some(c) => c.chown(ctx, name, uid, gid),
        None => Err(FsError::not_supported("chown", name)),
    }
}

/// Set access and modification times of `name`.
pub fn chtimes(
    ctx: &Context,
    fsys: &SharedFs,
    name: &str,
    accessed: SystemTime,
    modified: SystemTime,
) -> Result<(), FsError> {
    ctx.check("chtimes")?;
    match fsys.capabilities().chtimes() {
        Some(c) => c.chtimes(ctx, name, accessed, modified),
        None => Err(FsError::not_supported("chtimes", name)),
    }
}

/// Create `link` pointing at `target`.
pub fn symlink(ctx: &Context, fsys: &SharedFs, target: &str, link: &str) -> Result<(), FsError> {
    ctx.check("symlink")?;
    match fsys.capabilities().symlink() {
        Some(s) => s.symlink(ctx, target, link),
        None => Err(FsError::not_supported("symlink", link)),
    }
}

/// Target of the symlink `name`.
pub fn readlink(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<String, FsError> {
    ctx.check("readlink")?;
    match fsys.capabilities().readlink() {
        Some(r) => r.readlink(ctx, name),
        None => Err(FsError::not_supported("readlink", name)),
    }
}

/// Shut the backend down. Backends without [`FsClose`](crate::FsClose)
/// have nothing to release.
pub fn close(ctx: &Context, fsys: &SharedFs) -> Result<(), FsError> {
    ctx.check("close")?;
    match fsys.capabilities().close() {
        Some(c) => c.close(ctx),
        None => Ok(()),
    }
}
