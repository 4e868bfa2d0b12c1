//! Directory capabilities.

use crate::{Context, DirEntry, Fs, FsError};

/// Single-level directory listing.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn FsReadDir`.
pub trait FsReadDir: Fs {
    /// List the direct children of `name`.
    ///
    /// Entries carry base names only (`DirEntry::path` is `None`).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    /// - [`FsError::NotADirectory`] if `name` is not a directory
    fn read_dir(&self, ctx: &Context, name: &str) -> Result<ReadDirIter, FsError>;
}

/// Native recursive traversal.
pub trait FsWalk: Fs {
    /// Walk below `root`.
    ///
    /// `depth == 0` is unlimited, `depth == n` yields entries at most `n`
    /// levels below `root`. The root itself is not yielded. Each entry's
    /// `path` is relative to `root`. Symlinks are yielded but not entered.
    fn walk(&self, ctx: &Context, root: &str, depth: usize) -> Result<ReadDirIter, FsError>;
}

/// Create one directory.
pub trait FsMkdir: Fs {
    /// Create `name` with [`ctx.dir_mode()`](Context::dir_mode).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the parent does not exist
    /// - [`FsError::AlreadyExists`] if `name` already exists
    fn mkdir(&self, ctx: &Context, name: &str) -> Result<(), FsError>;
}

/// Create a directory and its parents.
pub trait FsMkdirAll: Fs {
    /// Create `name` and missing parents. Succeeds if it already exists.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] if a component exists but is not a directory
    fn mkdir_all(&self, ctx: &Context, name: &str) -> Result<(), FsError>;
}

/// Iterator over directory entries.
///
/// Wraps a boxed iterator for flexibility across different backends.
///
/// - Outer `Result` (from [`FsReadDir::read_dir`]) = "can I open this directory?"
/// - Inner `Result` (per item) = "can I read this entry?"
pub struct ReadDirIter(Box<dyn Iterator<Item = Result<DirEntry, FsError>> + Send + 'static>);

impl ReadDirIter {
    /// Create from any compatible iterator.
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<DirEntry, FsError>> + Send + 'static,
    {
        Self(Box::new(iter))
    }

    /// Create from a pre-collected snapshot of entries.
    pub fn from_vec(entries: Vec<Result<DirEntry, FsError>>) -> Self {
        Self(Box::new(entries.into_iter()))
    }

    /// Collect all entries, short-circuiting on first error.
    pub fn collect_all(self) -> Result<Vec<DirEntry>, FsError> {
        self.collect()
    }
}

impl Iterator for ReadDirIter {
    type Item = Result<DirEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }
}

impl std::fmt::Debug for ReadDirIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadDirIter").finish_non_exhaustive()
    }
}
