//! Uniquely named temporary files and directories.

use super::{SharedFs, native};
use crate::{Context, FileWrite, FsError, path};

/// Permission bits of directories made by the [`temp_dir`] fallback.
pub const TEMP_DIR_MODE: u32 = 0o700;

/// Create a new file in `dir` named `prefix-<random hex>`.
///
/// Returns the open handle and the created name.
pub fn temp_file(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
    prefix: &str,
) -> Result<(Box<dyn FileWrite>, String), FsError> {
    ctx.check("temp_file")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("temp_file", dir, caps.temp_file(), |t| {
        t.temp_file(ctx, dir, prefix)
    }) {
        return result;
    }
    let name = temp_name(dir, prefix);
    let file = super::create(ctx, fsys, &name)?;
    Ok((file, name))
}

/// Create a new directory in `dir` named `prefix-<random hex>`.
///
/// The fallback creates it with mode [`TEMP_DIR_MODE`].
pub fn temp_dir(ctx: &Context, fsys: &SharedFs, dir: &str, prefix: &str) -> Result<String, FsError> {
    ctx.check("temp_dir")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("temp_dir", dir, caps.temp_dir(), |t| t.temp_dir(ctx, dir, prefix)) {
        return result;
    }
    let name = temp_name(dir, prefix);
    super::mkdir(&ctx.with_dir_mode(TEMP_DIR_MODE), fsys, &name)?;
    Ok(name)
}

/// `dir/prefix-<32 hex chars>`, `tmp` standing in for an empty prefix.
fn temp_name(dir: &str, prefix: &str) -> String {
    let prefix = if prefix.is_empty() { "tmp" } else { prefix };
    let suffix = hex::encode(rand::random::<[u8; 16]>());
    path::join(&[dir, &format!("{prefix}-{suffix}")])
}
