//! # Filesystem Traits
//!
//! The contract hierarchy that backends implement.
//!
//! ## Minimal Contract Plus Capabilities
//!
//! Every backend implements [`Fs`], which only knows how to open a name for
//! reading. Everything else is an optional capability trait. A backend
//! implements the ones it supports and advertises them through
//! [`Fs::capabilities`]:
//!
//! ```text
//! Fs ─┬─ FsStat, FsClose
//!     ├─ FsCreate, FsAppend, FsTruncate, FsRemove, FsRemoveAll, FsRename
//!     ├─ FsReadDir, FsWalk, FsMkdir, FsMkdirAll
//!     ├─ FsSymlink, FsReadlink
//!     ├─ FsChmod, FsChown, FsChtimes
//!     ├─ FsAbs, FsRel, FsLocalize, FsGlob
//!     └─ FsDirRead, FsDirAppend, FsDirTruncate, FsTempFile, FsTempDir
//! ```
//!
//! Callers normally go through [`ops`](crate::ops), which picks the native
//! capability when present and synthesizes the operation from simpler ones
//! when it is not.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync`. Methods take `&self` to enable concurrent
//! access. Backends use interior mutability for thread-safe state management.
//!
//! ## Object Safety
//!
//! All traits are object-safe and can be used as trait objects:
//!
//! ```rust
//! use capfs::{Context, Fs};
//!
//! fn describe(fs: &dyn Fs) -> Vec<&'static str> {
//!     fs.capabilities().names()
//! }
//! ```

mod capabilities;
mod fs_bulk;
mod fs_dir;
mod fs_link;
mod fs_path;
mod fs_permissions;
mod fs_read;
mod fs_write;

pub use capabilities::Capabilities;
pub use fs_bulk::{FsDirAppend, FsDirRead, FsDirTruncate, FsTempDir, FsTempFile};
pub use fs_dir::{FsMkdir, FsMkdirAll, FsReadDir, FsWalk, ReadDirIter};
pub use fs_link::{FsReadlink, FsSymlink};
pub use fs_path::{FsAbs, FsGlob, FsLocalize, FsRel};
pub use fs_permissions::{FsChmod, FsChown, FsChtimes};
pub use fs_read::{FileRead, Fs, FsClose, FsStat};
pub use fs_write::{
    FileWrite, FsAppend, FsCreate, FsRemove, FsRemoveAll, FsRename, FsTruncate,
};
