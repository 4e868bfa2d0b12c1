//! Tar producer: walks a directory and writes it into a pipe.

use std::io::{self, Read};
use std::sync::Arc;
use std::thread;
use std::time::UNIX_EPOCH;

use tar::{Builder, EntryType, Header};

use super::pipe::{self, PipeAbort, PipeWriter};
use crate::ops::{self, SharedFs};
use crate::{Context, DirEntry, FileRead, FileType, FsError, Metadata, ReadDirIter, path};

pub(super) fn spawn(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
) -> Result<Box<dyn FileRead>, FsError> {
    // Listing the root up front reports a missing directory to the caller.
    let entries = ops::walk(ctx, fsys, dir, 0)?;
    let (reader, writer) = pipe::pipe();

    let ctx = ctx.clone();
    let fsys = Arc::clone(fsys);
    let root = dir.to_string();
    thread::Builder::new()
        .name("capfs-tar".into())
        .spawn(move || {
            let abort = writer.abort_handle();
            let mut builder = Builder::new(writer);
            if let Err(error) = write_entries(&ctx, &fsys, &root, entries, &mut builder) {
                fail(&abort, &root, error);
                return;
            }
            if let Err(e) = builder.into_inner() {
                fail(&abort, &root, FsError::from_io("open_dir", root.as_str(), e));
            }
        })
        .map_err(|e| FsError::from_io("open_dir", dir, e))?;
    Ok(Box::new(reader))
}

fn fail(abort: &PipeAbort, root: &str, error: FsError) {
    tracing::warn!(path = %root, %error, "archive producer failed");
    abort.abort(error);
}

fn write_entries(
    ctx: &Context,
    fsys: &SharedFs,
    root: &str,
    entries: ReadDirIter,
    builder: &mut Builder<PipeWriter>,
) -> Result<(), FsError> {
    for entry in entries {
        ctx.check("open_dir")?;
        let entry = entry?;
        append_entry(ctx, fsys, root, &entry, builder)?;
        tracing::trace!(path = entry.relative_path(), "archived entry");
    }
    Ok(())
}

fn append_entry(
    ctx: &Context,
    fsys: &SharedFs,
    root: &str,
    entry: &DirEntry,
    builder: &mut Builder<PipeWriter>,
) -> Result<(), FsError> {
    let rel = entry.relative_path();
    let full = path::join(&[root, rel]);
    // Stat follows links, so a dangling link has no metadata to offer.
    let meta = match entry.file_type() {
        FileType::Symlink => None,
        _ => match entry.info(ctx, fsys, root) {
            Ok(meta) => Some(meta),
            Err(error) if error.is_not_supported() => None,
            Err(error) => return Err(error),
        },
    };
    let io_err = |e: io::Error| FsError::from_io("open_dir", rel, e);

    let mut header = Header::new_gnu();
    header.set_mtime(mtime(meta.as_ref()));
    header.set_size(0);

    match entry.file_type() {
        FileType::Directory => {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(meta.as_ref().map_or(ctx.dir_mode().perm(), |m| m.mode.perm()));
            builder
                .append_data(&mut header, format!("{rel}/"), io::empty())
                .map_err(io_err)
        }
        FileType::Symlink => {
            let target = ops::readlink(ctx, fsys, &full)?;
            header.set_entry_type(EntryType::Symlink);
            header.set_mode(meta.as_ref().map_or(0o777, |m| m.mode.perm()));
            builder
                .append_link(&mut header, rel, target)
                .map_err(io_err)
        }
        FileType::File => {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(meta.as_ref().map_or(ctx.file_mode().perm(), |m| m.mode.perm()));
            let mut reader = ops::open(ctx, fsys, &full)?;
            match meta.as_ref().map(|m| m.size) {
                Some(size) => {
                    header.set_size(size);
                    builder
                        .append_data(&mut header, rel, (&mut reader).take(size))
                        .map_err(io_err)?;
                }
                None => {
                    let mut data = Vec::new();
                    reader.read_to_end(&mut data).map_err(io_err)?;
                    header.set_size(data.len() as u64);
                    builder
                        .append_data(&mut header, rel, data.as_slice())
                        .map_err(io_err)?;
                }
            }
            reader.close()
        }
    }
}

fn mtime(meta: Option<&Metadata>) -> u64 {
    meta.and_then(|m| m.modified.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs())
}
