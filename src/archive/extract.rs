//! Tar extractor: reads a pipe and materializes entries under a directory.

use std::io;
use std::sync::Arc;
use std::thread;

use tar::{Archive, EntryType};

use super::StreamWriter;
use super::pipe::{self, PipeAbort, PipeReader};
use crate::ops::{self, SharedFs};
use crate::{Context, ErrorKind, FileWrite, FsError, path};

pub(super) fn spawn(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
) -> Result<Box<dyn FileWrite>, FsError> {
    let (reader, writer) = pipe::pipe();
    let abort = reader.abort_handle();

    let ctx = ctx.clone();
    let fsys = Arc::clone(fsys);
    let root = dir.to_string();
    let worker = thread::Builder::new()
        .name("capfs-untar".into())
        .spawn(move || run(&ctx, &fsys, &root, reader))
        .map_err(|e| FsError::from_io("append_dir", dir, e))?;
    Ok(Box::new(StreamWriter::new(writer, worker, abort)))
}

fn run(ctx: &Context, fsys: &SharedFs, root: &str, reader: PipeReader) {
    let abort = reader.abort_handle();
    let mut archive = Archive::new(reader);
    // The archive holds the reader until the abort is recorded.
    if let Err(error) = unpack(ctx, fsys, root, &mut archive) {
        fail(&abort, root, error);
        return;
    }
    // Trailing zero blocks after the end-of-archive marker.
    let mut rest = archive.into_inner();
    if let Err(e) = io::copy(&mut rest, &mut io::sink()) {
        fail(&abort, root, FsError::from_io("append_dir", root, e));
    }
}

fn fail(abort: &PipeAbort, root: &str, error: FsError) {
    tracing::warn!(path = %root, %error, "archive extraction failed");
    abort.abort(error);
}

fn unpack(
    ctx: &Context,
    fsys: &SharedFs,
    root: &str,
    archive: &mut Archive<PipeReader>,
) -> Result<(), FsError> {
    let io_err = |e: io::Error| FsError::from_io("append_dir", root, e);
    for entry in archive.entries().map_err(io_err)? {
        ctx.check("append_dir")?;
        let mut entry = entry.map_err(io_err)?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let Some(rel) = entry_name(&name)? else {
            continue;
        };
        let target = path::join(&[root, &rel]);
        let kind = entry.header().entry_type();
        let mode = entry.header().mode().ok().map(|m| m & 0o7777);

        match kind {
            EntryType::Directory => {
                let ctx = mode.map_or_else(|| ctx.clone(), |m| ctx.with_dir_mode(m));
                ops::mkdir_all(&ctx, fsys, &target)?;
            }
            EntryType::Regular | EntryType::Continuous => {
                ensure_parent(ctx, fsys, root, &target)?;
                let ctx = mode.map_or_else(|| ctx.clone(), |m| ctx.with_file_mode(m));
                let mut writer = ops::create(&ctx, fsys, &target)?;
                io::copy(&mut entry, &mut writer)
                    .map_err(|e| FsError::from_io("append_dir", target.as_str(), e))?;
                writer.close()?;
            }
            EntryType::Symlink => {
                let link = entry
                    .link_name_bytes()
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .ok_or_else(|| FsError::invalid("append_dir", name.as_str(), "symlink without target"))?;
                ensure_parent(ctx, fsys, root, &target)?;
                match ops::symlink(ctx, fsys, &link, &target) {
                    Err(error) if error.kind() == ErrorKind::AlreadyExists => {
                        ops::remove(ctx, fsys, &target)?;
                        ops::symlink(ctx, fsys, &link, &target)?;
                    }
                    result => result?,
                }
            }
            other => {
                tracing::debug!(path = %name, entry_type = ?other, "skipping tar entry");
                continue;
            }
        }
        tracing::trace!(path = %target, "extracted entry");
    }
    Ok(())
}

/// Cleaned entry name relative to the target, `None` for the target itself.
///
/// Absolute names and names climbing out of the target are rejected.
fn entry_name(name: &str) -> Result<Option<String>, FsError> {
    let cleaned = path::clean(name);
    let trimmed = cleaned.trim_end_matches(['/', '\\']);
    let trimmed = trimmed
        .strip_prefix("./")
        .or_else(|| trimmed.strip_prefix(".\\"))
        .unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed == "." {
        return Ok(None);
    }
    if path::is_abs(trimmed) || trimmed == ".." || trimmed.starts_with("../") || trimmed.starts_with("..\\") {
        return Err(FsError::invalid(
            "append_dir",
            name,
            "entry escapes the target directory",
        ));
    }
    Ok(Some(trimmed.to_string()))
}

fn ensure_parent(ctx: &Context, fsys: &SharedFs, root: &str, target: &str) -> Result<(), FsError> {
    let parent = path::dir(target);
    if parent == root {
        return Ok(());
    }
    match ops::mkdir_all(ctx, fsys, &parent) {
        Err(error) if !error.is_not_supported() => Err(error),
        _ => Ok(()),
    }
}
