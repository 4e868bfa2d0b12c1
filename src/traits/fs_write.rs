//! Write-side capabilities.

use std::io::Write;

use crate::{Context, Fs, FsError};

/// A writable resource handle.
///
/// Closing consumes the handle. Streaming handles (append fallback, archive
/// extraction) report background failures from `close`, so callers must
/// check its result.
pub trait FileWrite: Write + Send {
    /// Flush and close the handle.
    fn close(mut self: Box<Self>) -> Result<(), FsError> {
        self.flush().map_err(|e| FsError::from_io("close", "", e))
    }

    /// Backend-native path of the resource, if the backend localizes names.
    fn native_path(&self) -> Option<&str> {
        None
    }
}

impl FileWrite for std::io::Sink {}

/// Create or truncate a resource for writing.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsCreate`.
pub trait FsCreate: Fs {
    /// Create `name`, truncating an existing resource.
    ///
    /// New resources get the permission bits of
    /// [`ctx.file_mode()`](Context::file_mode).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::IsADirectory`] if `name` is a directory
    fn create(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileWrite>, FsError>;
}

/// Open a resource for appending.
pub trait FsAppend: Fs {
    /// Open `name` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent directory does not exist
    /// - [`FsError::IsADirectory`] if `name` is a directory
    fn append(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileWrite>, FsError>;
}

/// Resize a resource in place.
pub trait FsTruncate: Fs {
    /// Truncate or zero-extend `name` to `size` bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    /// - [`FsError::IsADirectory`] if `name` is a directory
    fn truncate(&self, ctx: &Context, name: &str, size: u64) -> Result<(), FsError>;
}

/// Remove a single resource.
pub trait FsRemove: Fs {
    /// Remove a file or an empty directory.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    /// - [`FsError::DirectoryNotEmpty`] if `name` is a directory with children
    fn remove(&self, ctx: &Context, name: &str) -> Result<(), FsError>;
}

/// Remove a tree.
pub trait FsRemoveAll: Fs {
    /// Remove `name` and everything below it. A missing name is not an error.
    fn remove_all(&self, ctx: &Context, name: &str) -> Result<(), FsError>;
}

/// Rename a resource.
pub trait FsRename: Fs {
    /// Move `from` to `to`, replacing `to` if it is a file.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `from` does not exist
    fn rename(&self, ctx: &Context, from: &str, to: &str) -> Result<(), FsError>;
}
