//! Core types for the capfs filesystem abstraction.

use std::time::SystemTime;

use crate::ops::{self, SharedFs};
use crate::{Context, FsError, path};

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Mode bits: entry type plus permissions, laid out like Unix `st_mode`.
///
/// ```rust
/// use capfs::{FileMode, FileType};
///
/// let mode = FileMode::dir(0o755);
/// assert!(mode.is_dir());
/// assert_eq!(mode.perm(), 0o755);
/// assert_eq!(mode.file_type(), FileType::Directory);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMode(u32);

impl FileMode {
    /// Mask selecting the type bits.
    pub const TYPE_MASK: u32 = 0o170000;
    /// Directory type bits.
    pub const DIR: u32 = 0o040000;
    /// Regular file type bits.
    pub const REGULAR: u32 = 0o100000;
    /// Symbolic link type bits.
    pub const SYMLINK: u32 = 0o120000;
    /// Mask selecting permission bits (including setuid/setgid/sticky).
    pub const PERM_MASK: u32 = 0o7777;

    /// Create from raw bits. A value without type bits is a regular file.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        if bits & Self::TYPE_MASK == 0 {
            Self(bits | Self::REGULAR)
        } else {
            Self(bits)
        }
    }

    /// Regular file with the given permissions.
    #[inline]
    pub const fn from_perm(perm: u32) -> Self {
        Self(Self::REGULAR | (perm & Self::PERM_MASK))
    }

    /// Directory with the given permissions.
    #[inline]
    pub const fn dir(perm: u32) -> Self {
        Self(Self::DIR | (perm & Self::PERM_MASK))
    }

    /// Symbolic link with the given permissions.
    #[inline]
    pub const fn symlink(perm: u32) -> Self {
        Self(Self::SYMLINK | (perm & Self::PERM_MASK))
    }

    /// The raw mode value.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Permission bits only.
    #[inline]
    pub const fn perm(&self) -> u32 {
        self.0 & Self::PERM_MASK
    }

    /// Type bits only.
    #[inline]
    pub const fn type_bits(&self) -> Self {
        Self(self.0 & Self::TYPE_MASK)
    }

    /// Same type with different permissions.
    #[inline]
    pub const fn with_perm(&self, perm: u32) -> Self {
        Self((self.0 & Self::TYPE_MASK) | (perm & Self::PERM_MASK))
    }

    /// The entry type encoded in the mode.
    pub const fn file_type(&self) -> FileType {
        match self.0 & Self::TYPE_MASK {
            Self::DIR => FileType::Directory,
            Self::SYMLINK => FileType::Symlink,
            _ => FileType::File,
        }
    }

    /// Returns `true` for directory modes.
    #[inline]
    pub const fn is_dir(&self) -> bool {
        self.0 & Self::TYPE_MASK == Self::DIR
    }

    /// Returns `true` for symbolic link modes.
    #[inline]
    pub const fn is_symlink(&self) -> bool {
        self.0 & Self::TYPE_MASK == Self::SYMLINK
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::from_perm(crate::context::DEFAULT_FILE_MODE)
    }
}

/// Metadata for a filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Base name of the entry.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Type and permission bits.
    pub mode: FileMode,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
}

impl Metadata {
    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.mode.file_type() == FileType::File
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }

    /// Type of the entry.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.mode.file_type()
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            mode: FileMode::default(),
            modified: SystemTime::UNIX_EPOCH,
        }
    }
}

/// A directory entry returned from listing or walking.
///
/// Entries are owned snapshots; a backend mutating afterwards does not change
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Base name of the entry.
    pub name: String,
    /// Path relative to the walk root. Only walks fill this in.
    pub path: Option<String>,
    /// Type bits of the entry.
    pub mode: FileMode,
    /// Metadata captured while listing, if the backend had it at hand.
    pub metadata: Option<Metadata>,
}

impl DirEntry {
    /// Entry with a name and type bits, no metadata.
    pub fn new(name: impl Into<String>, mode: FileMode) -> Self {
        Self {
            name: name.into(),
            path: None,
            mode: mode.type_bits(),
            metadata: None,
        }
    }

    /// Entry built from full metadata.
    pub fn from_metadata(metadata: Metadata) -> Self {
        Self {
            name: metadata.name.clone(),
            path: None,
            mode: metadata.mode.type_bits(),
            metadata: Some(metadata),
        }
    }

    /// Returns `true` if the entry is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// Type of the entry.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.mode.file_type()
    }

    /// Path of the entry relative to whatever was listed or walked.
    ///
    /// Walk entries return their walk-relative path, listing entries their
    /// name.
    pub fn relative_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.name)
    }

    /// Full metadata, from the listing if it carried any, otherwise by
    /// stat-ing `base` joined with [`relative_path`](Self::relative_path).
    ///
    /// `base` is the directory that was listed or walked.
    pub fn info(&self, ctx: &Context, fsys: &SharedFs, base: &str) -> Result<Metadata, FsError> {
        if let Some(meta) = &self.metadata {
            return Ok(meta.clone());
        }
        ops::stat(ctx, fsys, &path::join(&[base, self.relative_path()]))
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
