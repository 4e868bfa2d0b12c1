//! Metadata-changing operations.

use std::time::SystemTime;

use crate::{Context, FileMode, Fs, FsError};

/// Change permission bits.
///
/// # Note
///
/// Reading permissions is done via [`FsStat::stat`](super::FsStat::stat).
/// Only the permission bits of `mode` are meaningful; type bits are ignored.
pub trait FsChmod: Fs {
    /// Set permissions on `name`.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    fn chmod(&self, ctx: &Context, name: &str, mode: FileMode) -> Result<(), FsError>;
}

/// Change ownership.
pub trait FsChown: Fs {
    /// Set owner and group of `name`.
    fn chown(&self, ctx: &Context, name: &str, uid: u32, gid: u32) -> Result<(), FsError>;
}

/// Change timestamps.
pub trait FsChtimes: Fs {
    /// Set access and modification times of `name`.
    fn chtimes(
        &self,
        ctx: &Context,
        name: &str,
        accessed: SystemTime,
        modified: SystemTime,
    ) -> Result<(), FsError>;
}
