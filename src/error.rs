//! Error types for the capfs filesystem abstraction.

use std::io;

/// Stable classification of an [`FsError`].
///
/// Callers match on the kind rather than on the variant so that errors from
/// any backend can be handled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The named resource does not exist.
    NotFound,
    /// The named resource already exists.
    AlreadyExists,
    /// The backend refused access.
    PermissionDenied,
    /// An argument (path, size, pattern, archive entry) is invalid.
    InvalidArgument,
    /// The handle or stream was already closed.
    Closed,
    /// The backend does not implement the requested capability.
    NotSupported,
    /// A path component is not a directory.
    NotADirectory,
    /// A file-shaped operation targeted a directory.
    IsADirectory,
    /// The directory still has children.
    DirectoryNotEmpty,
    /// The request context was cancelled.
    Cancelled,
    /// The request context deadline passed.
    DeadlineExceeded,
    /// Anything else.
    Other,
}

/// Filesystem error type with operation and path context.
///
/// Every path-bearing variant records the operation name and the path
/// involved. Uses `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use capfs::{ErrorKind, FsError};
///
/// let err = FsError::not_found("open", "/missing");
/// assert_eq!(err.to_string(), "open: not found: /missing");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// Path does not exist.
    #[error("{operation}: not found: {path}")]
    NotFound {
        /// The operation that failed.
        operation: &'static str,
        /// The path that was not found.
        path: String,
    },

    /// Path already exists when it shouldn't.
    #[error("{operation}: already exists: {path}")]
    AlreadyExists {
        /// The operation that failed.
        operation: &'static str,
        /// The path that already exists.
        path: String,
    },

    /// Permission denied for operation.
    #[error("{operation}: permission denied: {path}")]
    PermissionDenied {
        /// The operation that was denied.
        operation: &'static str,
        /// The path where permission was denied.
        path: String,
    },

    /// Invalid argument.
    #[error("{operation}: invalid argument: {path} ({reason})")]
    InvalidArgument {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Handle or stream already closed.
    #[error("{operation}: closed: {path}")]
    Closed {
        /// The operation that failed.
        operation: &'static str,
        /// The path of the closed resource.
        path: String,
    },

    /// Capability not implemented by the backend.
    #[error("{operation}: operation not supported: {path}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
        /// The path involved.
        path: String,
    },

    /// Expected a directory but found something else.
    #[error("{operation}: not a directory: {path}")]
    NotADirectory {
        /// The operation that failed.
        operation: &'static str,
        /// The path that is not a directory.
        path: String,
    },

    /// Expected a file but found a directory.
    #[error("{operation}: is a directory: {path}")]
    IsADirectory {
        /// The operation that failed.
        operation: &'static str,
        /// The directory path.
        path: String,
    },

    /// Directory is not empty when it should be.
    #[error("{operation}: directory not empty: {path}")]
    DirectoryNotEmpty {
        /// The operation that failed.
        operation: &'static str,
        /// The path to the non-empty directory.
        path: String,
    },

    /// The request context was cancelled.
    #[error("{operation}: context cancelled")]
    Cancelled {
        /// The operation that observed the cancellation.
        operation: &'static str,
    },

    /// The request context deadline passed.
    #[error("{operation}: context deadline exceeded")]
    DeadlineExceeded {
        /// The operation that observed the deadline.
        operation: &'static str,
    },

    /// Generic backend error.
    #[error("{operation}: backend error: {path}: {message}")]
    Backend {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved.
        path: String,
        /// Backend-provided description.
        message: String,
    },

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Shorthand for [`FsError::NotFound`].
    pub fn not_found(operation: &'static str, path: impl Into<String>) -> Self {
        FsError::NotFound {
            operation,
            path: path.into(),
        }
    }

    /// Shorthand for [`FsError::NotSupported`].
    pub fn not_supported(operation: &'static str, path: impl Into<String>) -> Self {
        FsError::NotSupported {
            operation,
            path: path.into(),
        }
    }

    /// Shorthand for [`FsError::InvalidArgument`].
    pub fn invalid(
        operation: &'static str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FsError::InvalidArgument {
            operation,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound { .. } => ErrorKind::NotFound,
            FsError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            FsError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            FsError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            FsError::Closed { .. } => ErrorKind::Closed,
            FsError::NotSupported { .. } => ErrorKind::NotSupported,
            FsError::NotADirectory { .. } => ErrorKind::NotADirectory,
            FsError::IsADirectory { .. } => ErrorKind::IsADirectory,
            FsError::DirectoryNotEmpty { .. } => ErrorKind::DirectoryNotEmpty,
            FsError::Cancelled { .. } => ErrorKind::Cancelled,
            FsError::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            FsError::Backend { .. } | FsError::Io { .. } => ErrorKind::Other,
        }
    }

    /// Returns `true` for the sentinel "capability not implemented" error.
    ///
    /// This is the only condition that makes the orchestrator fall back.
    #[inline]
    pub fn is_not_supported(&self) -> bool {
        self.kind() == ErrorKind::NotSupported
    }

    /// Returns `true` if the resource does not exist.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// The operation recorded on this error.
    pub fn operation(&self) -> &'static str {
        match self {
            FsError::NotFound { operation, .. }
            | FsError::AlreadyExists { operation, .. }
            | FsError::PermissionDenied { operation, .. }
            | FsError::InvalidArgument { operation, .. }
            | FsError::Closed { operation, .. }
            | FsError::NotSupported { operation, .. }
            | FsError::NotADirectory { operation, .. }
            | FsError::IsADirectory { operation, .. }
            | FsError::DirectoryNotEmpty { operation, .. }
            | FsError::Cancelled { operation }
            | FsError::DeadlineExceeded { operation }
            | FsError::Backend { operation, .. }
            | FsError::Io { operation, .. } => operation,
        }
    }

    /// The path recorded on this error, empty when none applies.
    pub fn path(&self) -> &str {
        match self {
            FsError::NotFound { path, .. }
            | FsError::AlreadyExists { path, .. }
            | FsError::PermissionDenied { path, .. }
            | FsError::InvalidArgument { path, .. }
            | FsError::Closed { path, .. }
            | FsError::NotSupported { path, .. }
            | FsError::NotADirectory { path, .. }
            | FsError::IsADirectory { path, .. }
            | FsError::DirectoryNotEmpty { path, .. }
            | FsError::Backend { path, .. }
            | FsError::Io { path, .. } => path,
            FsError::Cancelled { .. } | FsError::DeadlineExceeded { .. } => "",
        }
    }

    /// Convert an [`io::Error`] into a classified `FsError`.
    ///
    /// An `FsError` that was previously wrapped into an `io::Error` (for
    /// example to cross a `Read`/`Write` boundary) is unwrapped unchanged.
    pub fn from_io(operation: &'static str, path: impl Into<String>, error: io::Error) -> Self {
        let error = match error.downcast::<FsError>() {
            Ok(fs_err) => return fs_err,
            Err(error) => error,
        };

        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { operation, path },
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists { operation, path },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { operation, path },
            io::ErrorKind::InvalidInput => FsError::InvalidArgument {
                operation,
                path,
                reason: error.to_string(),
            },
            io::ErrorKind::BrokenPipe => FsError::Closed { operation, path },
            io::ErrorKind::Unsupported => FsError::NotSupported { operation, path },
            io::ErrorKind::NotADirectory => FsError::NotADirectory { operation, path },
            io::ErrorKind::IsADirectory => FsError::IsADirectory { operation, path },
            io::ErrorKind::DirectoryNotEmpty => FsError::DirectoryNotEmpty { operation, path },
            _ => FsError::Io {
                operation,
                path,
                source: error,
            },
        }
    }
}

impl From<io::Error> for FsError {
    fn from(error: io::Error) -> Self {
        FsError::from_io("io", String::new(), error)
    }
}

impl From<FsError> for io::Error {
    fn from(error: FsError) -> Self {
        let kind = match error.kind() {
            ErrorKind::NotFound => io::ErrorKind::NotFound,
            ErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
            ErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
            ErrorKind::InvalidArgument => io::ErrorKind::InvalidInput,
            ErrorKind::Closed => io::ErrorKind::BrokenPipe,
            ErrorKind::NotSupported => io::ErrorKind::Unsupported,
            ErrorKind::NotADirectory => io::ErrorKind::NotADirectory,
            ErrorKind::IsADirectory => io::ErrorKind::IsADirectory,
            ErrorKind::DirectoryNotEmpty => io::ErrorKind::DirectoryNotEmpty,
            ErrorKind::DeadlineExceeded => io::ErrorKind::TimedOut,
            ErrorKind::Cancelled => io::ErrorKind::Interrupted,
            ErrorKind::Other => io::ErrorKind::Other,
        };
        io::Error::new(kind, error)
    }
}
