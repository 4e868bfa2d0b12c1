//! Bulk-directory and temporary-resource capabilities.
//!
//! Bulk-directory streams use the standard tar format. Entry names are
//! relative to the directory, directories carry a trailing `/`, and header
//! mode bits are honored on extraction.

use crate::{Context, FileRead, FileWrite, Fs, FsError};

/// Read a whole directory as a tar stream.
pub trait FsDirRead: Fs {
    /// Stream the contents of directory `name` as a tar archive.
    fn open_dir(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError>;
}

/// Extract a tar stream into a directory.
pub trait FsDirAppend: Fs {
    /// Return a sink that extracts the tar stream written to it into `name`.
    ///
    /// Files with matching names are overwritten, unrelated files are left
    /// alone. Extraction errors surface on `write` or `close`.
    fn append_dir(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileWrite>, FsError>;
}

/// Empty a directory.
pub trait FsDirTruncate: Fs {
    /// Remove all contents of `name`, leaving it present and empty.
    fn truncate_dir(&self, ctx: &Context, name: &str) -> Result<(), FsError>;
}

/// Create uniquely named files.
pub trait FsTempFile: Fs {
    /// Create a new file in `dir` whose name starts with `prefix`.
    ///
    /// Returns the open handle and the created name.
    fn temp_file(
        &self,
        ctx: &Context,
        dir: &str,
        prefix: &str,
    ) -> Result<(Box<dyn FileWrite>, String), FsError>;
}

/// Create uniquely named directories.
pub trait FsTempDir: Fs {
    /// Create a new directory in `dir` whose name starts with `prefix`.
    fn temp_dir(&self, ctx: &Context, dir: &str, prefix: &str) -> Result<String, FsError>;
}
