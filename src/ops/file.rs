//! Byte-stream operations: open, create, append, truncate, rename.

use std::io::{self, Read, Write};
use std::thread;

use super::{SharedFs, dir_name, is_directory, native};
use crate::archive::{self, StreamWriter, pipe};
use crate::{Context, ErrorKind, FileRead, FileWrite, FsError, path};

/// Open `name` for reading.
///
/// A directory (trailing separator, or stat reports one) opens as a tar
/// stream of its contents.
pub fn open(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<Box<dyn FileRead>, FsError> {
    ctx.check("open")?;
    if is_directory(ctx, fsys, name) {
        return archive::open_dir(ctx, fsys, &dir_name(name));
    }
    fsys.open(ctx, name)
}

/// Create or truncate `name` for writing.
///
/// A directory is emptied and the returned handle extracts a tar stream
/// into it. If the native create reports a missing parent, the parents are
/// created and the call is retried once.
pub fn create(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<Box<dyn FileWrite>, FsError> {
    ctx.check("create")?;
    if is_directory(ctx, fsys, name) {
        return create_dir(ctx, fsys, &dir_name(name));
    }
    let caps = fsys.capabilities();
    let creator = caps
        .create()
        .ok_or_else(|| FsError::not_supported("create", name))?;
    with_parent_retry(ctx, fsys, "create", name, || creator.create(ctx, name))
}

/// Open `name` for appending, creating it if missing.
///
/// Without a native append, the old content is read, the resource is
/// recreated, and a background thread writes the old bytes followed by
/// everything written to the returned handle. Errors from that thread
/// surface on the next write or on `close`.
pub fn append(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<Box<dyn FileWrite>, FsError> {
    ctx.check("append")?;
    if is_directory(ctx, fsys, name) {
        return archive::append_dir(ctx, fsys, &dir_name(name));
    }
    let caps = fsys.capabilities();
    if let Some(result) = native("append", name, caps.append(), |appender| {
        with_parent_retry(ctx, fsys, "append", name, || appender.append(ctx, name))
    }) {
        return result;
    }
    append_fallback(ctx, fsys, name)
}

/// Resize `name` to `size` bytes.
///
/// For a directory only `size == 0` is valid and removes all its contents.
pub fn truncate(ctx: &Context, fsys: &SharedFs, name: &str, size: u64) -> Result<(), FsError> {
    ctx.check("truncate")?;
    if is_directory(ctx, fsys, name) {
        if size != 0 {
            return Err(FsError::invalid(
                "truncate",
                name,
                "directories can only be truncated to size 0",
            ));
        }
        return super::truncate_dir(ctx, fsys, &dir_name(name));
    }
    let caps = fsys.capabilities();
    if let Some(result) = native("truncate", name, caps.truncate(), |t| {
        t.truncate(ctx, name, size)
    }) {
        return result;
    }

    if size == 0 {
        super::remove(ctx, fsys, name)?;
        return create(ctx, fsys, name)?.close();
    }

    let mut kept = Vec::new();
    let mut reader = open(ctx, fsys, name)?;
    let limit = usize::try_from(size)
        .map_err(|_| FsError::invalid("truncate", name, "size exceeds addressable memory"))?;
    (&mut reader)
        .take(size)
        .read_to_end(&mut kept)
        .map_err(|e| FsError::from_io("truncate", name, e))?;
    reader.close()?;
    kept.resize(limit, 0);

    super::remove(ctx, fsys, name)?;
    let mut writer = create(ctx, fsys, name)?;
    writer
        .write_all(&kept)
        .map_err(|e| FsError::from_io("truncate", name, e))?;
    writer.close()
}

/// Move `from` to `to`.
///
/// Without a native rename the bytes are copied and the source removed. A
/// failure part way leaves whatever was already copied in place.
pub fn rename(ctx: &Context, fsys: &SharedFs, from: &str, to: &str) -> Result<(), FsError> {
    ctx.check("rename")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("rename", from, caps.rename(), |r| r.rename(ctx, from, to)) {
        return result;
    }

    if is_directory(ctx, fsys, from) {
        let src = dir_name(from);
        let mut reader = archive::open_dir(ctx, fsys, &src)?;
        let mut writer = create_dir(ctx, fsys, &dir_name(to))?;
        copy(&mut reader, &mut writer, "rename", from)?;
        writer.close()?;
        reader.close()?;
        return super::remove_all(ctx, fsys, &src);
    }

    let mut reader = open(ctx, fsys, from)?;
    let mut writer = create(ctx, fsys, to)?;
    copy(&mut reader, &mut writer, "rename", from)?;
    writer.close()?;
    reader.close()?;
    super::remove(ctx, fsys, from)
}

/// Read the whole content of `name`.
pub fn read_file(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<Vec<u8>, FsError> {
    let mut reader = open(ctx, fsys, name)?;
    let mut data = Vec::new();
    reader
        .read_to_end(&mut data)
        .map_err(|e| FsError::from_io("read_file", name, e))?;
    reader.close()?;
    Ok(data)
}

/// Replace the content of `name` with `data`.
pub fn write_file(ctx: &Context, fsys: &SharedFs, name: &str, data: &[u8]) -> Result<(), FsError> {
    let mut writer = create(ctx, fsys, name)?;
    writer
        .write_all(data)
        .map_err(|e| FsError::from_io("write_file", name, e))?;
    writer.close()
}

/// Make sure the directory exists and is empty, then extract into it.
fn create_dir(ctx: &Context, fsys: &SharedFs, dir: &str) -> Result<Box<dyn FileWrite>, FsError> {
    super::mkdir_all(ctx, fsys, dir)?;
    super::truncate_dir(ctx, fsys, dir)?;
    archive::append_dir(ctx, fsys, dir)
}

fn with_parent_retry<T>(
    ctx: &Context,
    fsys: &SharedFs,
    operation: &'static str,
    name: &str,
    call: impl Fn() -> Result<T, FsError>,
) -> Result<T, FsError> {
    match call() {
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let caps = fsys.capabilities();
            if caps.mkdir().is_none() && caps.mkdir_all().is_none() {
                return Err(error);
            }
            let parent = path::dir(name);
            tracing::debug!(operation, path = name, parent = %parent, "creating parents and retrying");
            super::mkdir_all(ctx, fsys, &parent)?;
            call()
        }
        result => result,
    }
}

fn append_fallback(
    ctx: &Context,
    fsys: &SharedFs,
    name: &str,
) -> Result<Box<dyn FileWrite>, FsError> {
    let old = match open(ctx, fsys, name) {
        Ok(reader) => Some(reader),
        Err(error) if error.is_not_found() => None,
        Err(error) => return Err(error),
    };
    let dest = create(ctx, fsys, name)?;

    let (reader, writer) = pipe::pipe();
    let abort = reader.abort_handle();
    let target = name.to_string();
    let worker = thread::Builder::new()
        .name("capfs-append".into())
        .spawn(move || {
            let mut reader = reader;
            if let Err(error) = forward(old, &mut reader, dest, &target) {
                tracing::warn!(path = %target, %error, "append stream failed");
                reader.close_with_error(error);
            }
        })
        .map_err(|e| FsError::from_io("append", name, e))?;
    Ok(Box::new(StreamWriter::new(writer, worker, abort)))
}

fn forward(
    old: Option<Box<dyn FileRead>>,
    live: &mut pipe::PipeReader,
    mut dest: Box<dyn FileWrite>,
    name: &str,
) -> Result<(), FsError> {
    if let Some(mut old) = old {
        copy(&mut old, &mut dest, "append", name)?;
        old.close()?;
    }
    copy(live, &mut dest, "append", name)?;
    dest.close()
}

fn copy<R, W>(reader: &mut R, writer: &mut W, operation: &'static str, name: &str) -> Result<u64, FsError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    io::copy(reader, writer).map_err(|e| FsError::from_io(operation, name, e))
}
