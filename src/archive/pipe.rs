//! Bounded in-process pipe connecting a streaming thread to its caller.
//!
//! Bytes travel as owned chunks over a `crossbeam-channel` bounded channel.
//! Each direction has an abort slot: aborting the writer makes the reader
//! fail with that error, aborting the reader makes the writer fail with it.
//! Dropping either end without an abort is a clean close: the reader sees
//! EOF, the writer sees [`FsError::Closed`].

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::{FileRead, FileWrite, FsError};

/// Chunks buffered before the writer blocks.
const PIPE_DEPTH: usize = 16;

#[derive(Debug, Default)]
struct AbortSlot {
    aborted: AtomicBool,
    error: Mutex<Option<FsError>>,
}

impl AbortSlot {
    fn set(&self, error: FsError) {
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.aborted.swap(true, Ordering::AcqRel) {
            *slot = Some(error);
        }
    }

    fn is_set(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// The abort error on first call, `Closed` on later ones.
    fn take(&self, operation: &'static str) -> Option<FsError> {
        if !self.is_set() {
            return None;
        }
        let mut slot = self.error.lock().unwrap_or_else(PoisonError::into_inner);
        Some(slot.take().unwrap_or(FsError::Closed {
            operation,
            path: String::new(),
        }))
    }
}

#[derive(Debug, Default)]
struct Shared {
    reader: AbortSlot,
    writer: AbortSlot,
}

/// Create a connected reader/writer pair.
pub fn pipe() -> (PipeReader, PipeWriter) {
    let (tx, rx) = crossbeam_channel::bounded(PIPE_DEPTH);
    let shared = Arc::new(Shared::default());
    (
        PipeReader {
            rx: Some(rx),
            chunk: Vec::new(),
            pos: 0,
            shared: Arc::clone(&shared),
        },
        PipeWriter {
            tx: Some(tx),
            shared,
        },
    )
}

/// Aborts one end of a pipe after that end has been moved elsewhere.
#[derive(Debug, Clone)]
pub struct PipeAbort {
    shared: Arc<Shared>,
    reader_side: bool,
}

impl PipeAbort {
    /// Fail the opposite end with `error`.
    pub fn abort(&self, error: FsError) {
        if self.reader_side {
            self.shared.reader.set(error);
        } else {
            self.shared.writer.set(error);
        }
    }

    /// Take the error this end was aborted with, if any.
    pub fn take_error(&self, operation: &'static str) -> Option<FsError> {
        if self.reader_side {
            self.shared.reader.take(operation)
        } else {
            self.shared.writer.take(operation)
        }
    }
}

/// Reading end of a [`pipe`].
#[derive(Debug)]
pub struct PipeReader {
    rx: Option<Receiver<Vec<u8>>>,
    chunk: Vec<u8>,
    pos: usize,
    shared: Arc<Shared>,
}

impl PipeReader {
    /// Handle that aborts this reader once it has been handed off.
    pub fn abort_handle(&self) -> PipeAbort {
        PipeAbort {
            shared: Arc::clone(&self.shared),
            reader_side: true,
        }
    }

    /// Close the reader so the writer's next write fails with `error`.
    pub fn close_with_error(mut self, error: FsError) {
        self.shared.reader.set(error);
        self.rx.take();
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.pos >= self.chunk.len() {
            if let Some(error) = self.shared.writer.take("read") {
                return Err(error.into());
            }
            let Some(rx) = self.rx.as_ref() else {
                return Ok(0);
            };
            // Prefer a buffered chunk, then block.
            let next = match rx.try_recv() {
                Ok(chunk) => Some(chunk),
                Err(TryRecvError::Disconnected) => None,
                Err(TryRecvError::Empty) => rx.recv().ok(),
            };
            match next {
                Some(chunk) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                None => {
                    if let Some(error) = self.shared.writer.take("read") {
                        return Err(error.into());
                    }
                    self.rx = None;
                    return Ok(0);
                }
            }
        }
        let n = buf.len().min(self.chunk.len() - self.pos);
        buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl FileRead for PipeReader {
    fn close(mut self: Box<Self>) -> Result<(), FsError> {
        self.rx.take();
        Ok(())
    }
}

/// Writing end of a [`pipe`].
#[derive(Debug)]
pub struct PipeWriter {
    tx: Option<Sender<Vec<u8>>>,
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// Handle that aborts this writer once it has been handed off.
    pub fn abort_handle(&self) -> PipeAbort {
        PipeAbort {
            shared: Arc::clone(&self.shared),
            reader_side: false,
        }
    }

    /// Close the writer so the reader fails with `error` instead of EOF.
    pub fn close_with_error(mut self, error: FsError) {
        self.shared.writer.set(error);
        self.tx.take();
    }

    fn closed(&self) -> io::Error {
        let error = self.shared.reader.take("write").unwrap_or(FsError::Closed {
            operation: "write",
            path: String::new(),
        });
        error.into()
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.shared.writer.is_set() || self.shared.reader.is_set() {
            return Err(self.closed());
        }
        let Some(tx) = self.tx.as_ref() else {
            return Err(self.closed());
        };
        if buf.is_empty() {
            return Ok(0);
        }
        match tx.send(buf.to_vec()) {
            Ok(()) => Ok(buf.len()),
            Err(_) => Err(self.closed()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileWrite for PipeWriter {
    fn close(mut self: Box<Self>) -> Result<(), FsError> {
        self.tx.take();
        Ok(())
    }
}
