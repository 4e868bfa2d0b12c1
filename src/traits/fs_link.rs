//! Symbolic link operations.

use crate::{Context, Fs, FsError};

/// Create symbolic links.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsSymlink`.
pub trait FsSymlink: Fs {
    /// Create `link` pointing at `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - The path the symlink points to (does not need to exist)
    /// * `link` - The path where the symlink is created
    ///
    /// # Errors
    ///
    /// - [`FsError::AlreadyExists`] if `link` already exists
    /// - [`FsError::NotFound`] if parent of `link` does not exist
    fn symlink(&self, ctx: &Context, target: &str, link: &str) -> Result<(), FsError>;
}

/// Read symbolic links.
pub trait FsReadlink: Fs {
    /// Return the raw target of the symlink at `name`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    /// - [`FsError::InvalidArgument`] if `name` is not a symlink
    fn readlink(&self, ctx: &Context, name: &str) -> Result<String, FsError>;
}
