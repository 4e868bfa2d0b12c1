//! Request-scoped configuration.
//!
//! A [`Context`] is threaded as the first argument of every operation. It
//! carries cancellation and an optional deadline, plus three overrides that
//! backends and fallbacks consult:
//!
//! | Accessor | Default |
//! |----------|---------|
//! | [`Context::file_mode`] | `0o644` |
//! | [`Context::dir_mode`] | `0o755` |
//! | [`Context::work_dir`] | `""` (backend default) |
//!
//! Contexts are immutable. Every `with_*` call returns a new value layered on
//! its parent, so independent chains never see each other's overrides.
//!
//! ```rust
//! use capfs::Context;
//!
//! let base = Context::background();
//! let private = base.with_file_mode(0o600);
//!
//! assert_eq!(base.file_mode().perm(), 0o644);
//! assert_eq!(private.file_mode().perm(), 0o600);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::{FileMode, FsError};

/// Default permission bits for newly created files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Default permission bits for newly created directories.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Debug)]
struct CancelNode {
    cancelled: AtomicBool,
    parent: Option<Arc<CancelNode>>,
}

impl CancelNode {
    fn is_cancelled(&self) -> bool {
        let mut node = Some(self);
        while let Some(current) = node {
            if current.cancelled.load(Ordering::Acquire) {
                return true;
            }
            node = current.parent.as_deref();
        }
        false
    }
}

/// Cancels every [`Context`] derived from [`Context::with_cancel`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    node: Arc<CancelNode>,
}

impl CancelHandle {
    /// Cancel the associated context chain. Idempotent.
    pub fn cancel(&self) {
        self.node.cancelled.store(true, Ordering::Release);
    }
}

/// Cancellation/deadline token carrying request-scoped configuration.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<Arc<CancelNode>>,
    deadline: Option<Instant>,
    file_mode: Option<u32>,
    dir_mode: Option<u32>,
    work_dir: Option<Arc<str>>,
}

impl Context {
    /// A context that is never cancelled and has no overrides.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context with a new file-creation mode.
    pub fn with_file_mode(&self, mode: u32) -> Self {
        Self {
            file_mode: Some(mode & 0o7777),
            ..self.clone()
        }
    }

    /// Derive a context with a new directory-creation mode.
    pub fn with_dir_mode(&self, mode: u32) -> Self {
        Self {
            dir_mode: Some(mode & 0o7777),
            ..self.clone()
        }
    }

    /// Derive a context with a working directory.
    pub fn with_work_dir(&self, dir: impl Into<String>) -> Self {
        Self {
            work_dir: Some(Arc::from(dir.into())),
            ..self.clone()
        }
    }

    /// Derive a context that expires at `deadline`.
    ///
    /// A parent deadline that is already earlier stays in force.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Self {
            deadline: Some(deadline),
            ..self.clone()
        }
    }

    /// Derive a context that expires after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a cancellable context.
    ///
    /// Cancelling the returned handle cancels the new context and anything
    /// derived from it; the parent is unaffected. Cancelling the parent still
    /// cancels the child.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        let node = Arc::new(CancelNode {
            cancelled: AtomicBool::new(false),
            parent: self.cancel.clone(),
        });
        let ctx = Self {
            cancel: Some(Arc::clone(&node)),
            ..self.clone()
        };
        (ctx, CancelHandle { node })
    }

    /// File-creation mode, `0o644` when unset.
    pub fn file_mode(&self) -> FileMode {
        FileMode::from_perm(self.file_mode.unwrap_or(DEFAULT_FILE_MODE))
    }

    /// Directory-creation mode, `0o755` when unset.
    pub fn dir_mode(&self) -> FileMode {
        FileMode::dir(self.dir_mode.unwrap_or(DEFAULT_DIR_MODE))
    }

    /// Working directory, empty when unset.
    pub fn work_dir(&self) -> &str {
        self.work_dir.as_deref().unwrap_or("")
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns `true` once the context chain has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|node| node.is_cancelled())
    }

    /// Fail with `Cancelled` or `DeadlineExceeded` if the context is done.
    pub fn check(&self, operation: &'static str) -> Result<(), FsError> {
        if self.is_cancelled() {
            return Err(FsError::Cancelled { operation });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(FsError::DeadlineExceeded { operation });
        }
        Ok(())
    }
}
