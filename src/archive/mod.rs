//! # Bulk-Directory Archives
//!
//! A whole directory travels as a standard tar stream. Reading a directory
//! produces one, writing one into a directory extracts it. Backends that
//! implement [`FsDirRead`](crate::FsDirRead) or
//! [`FsDirAppend`](crate::FsDirAppend) are used directly. Everything else
//! gets a producer or extractor thread connected to the caller through a
//! bounded [`pipe`].
//!
//! Entry names are relative to the directory, directories carry a trailing
//! `/`, and header mode bits are applied on extraction.

use std::io::{self, Write};
use std::thread::JoinHandle;

use crate::ops::{self, SharedFs};
use crate::{Context, FileRead, FileWrite, FsError};

mod extract;
pub(crate) mod pipe;
mod produce;

use pipe::{PipeAbort, PipeWriter};

/// Stream directory `dir` as a tar archive.
pub(crate) fn open_dir(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
) -> Result<Box<dyn FileRead>, FsError> {
    let caps = fsys.capabilities();
    if let Some(result) = native_dir_read(ctx, dir, caps.dir_read()) {
        return result;
    }
    produce::spawn(ctx, fsys, dir)
}

/// Sink that extracts a tar stream into directory `dir`.
pub(crate) fn append_dir(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
) -> Result<Box<dyn FileWrite>, FsError> {
    let caps = fsys.capabilities();
    if let Some(contract) = caps.dir_append() {
        match contract.append_dir(ctx, dir) {
            Err(error) if error.is_not_supported() => {
                tracing::debug!(path = dir, "native append_dir not supported, extracting");
            }
            result => return result,
        }
    }
    match ops::mkdir_all(ctx, fsys, dir) {
        Err(error) if !error.is_not_supported() => return Err(error),
        _ => {}
    }
    extract::spawn(ctx, fsys, dir)
}

fn native_dir_read(
    ctx: &Context,
    dir: &str,
    contract: Option<&dyn crate::FsDirRead>,
) -> Option<Result<Box<dyn FileRead>, FsError>> {
    match contract?.open_dir(ctx, dir) {
        Err(error) if error.is_not_supported() => {
            tracing::debug!(path = dir, "native open_dir not supported, producing");
            None
        }
        result => Some(result),
    }
}

/// Write handle feeding a background thread through a pipe.
///
/// `close` waits for the thread and returns the error it aborted with, if
/// any.
pub(crate) struct StreamWriter {
    pipe: Option<PipeWriter>,
    worker: Option<JoinHandle<()>>,
    abort: PipeAbort,
}

impl StreamWriter {
    pub(crate) fn new(pipe: PipeWriter, worker: JoinHandle<()>, abort: PipeAbort) -> Self {
        Self {
            pipe: Some(pipe),
            worker: Some(worker),
            abort,
        }
    }
}

impl Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.pipe.as_mut() {
            Some(pipe) => pipe.write(buf),
            None => Err(FsError::Closed {
                operation: "write",
                path: String::new(),
            }
            .into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileWrite for StreamWriter {
    fn close(mut self: Box<Self>) -> Result<(), FsError> {
        self.pipe.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("streaming thread panicked");
                return Err(FsError::Backend {
                    operation: "close",
                    path: String::new(),
                    message: "streaming thread panicked".into(),
                });
            }
        }
        match self.abort.take_error("close") {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
