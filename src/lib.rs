//! # capfs
//!
//! A capability-based filesystem abstraction with a fallback orchestrator.
//!
//! Backends (local disk, object stores, remote protocols, in-memory trees)
//! implement a minimal open contract plus whichever optional capabilities
//! they support. Callers use the [`ops`] functions, which call the native
//! capability when it is there and otherwise build the operation from
//! simpler ones: an append becomes read-old plus create plus stream, a
//! rename becomes copy plus remove, a directory becomes a tar stream.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use capfs::{ops, Capabilities, Context, FileRead, FileWrite, Fs, FsCreate, FsError, SharedFs};
//!
//! /// Accepts writes and discards them; every name reads as empty.
//! struct Null;
//!
//! impl Fs for Null {
//!     fn open(&self, _: &Context, _: &str) -> Result<Box<dyn FileRead>, FsError> {
//!         Ok(Box::new(std::io::empty()))
//!     }
//!
//!     fn capabilities(&self) -> Capabilities<'_> {
//!         Capabilities::new().with_create(self)
//!     }
//! }
//!
//! impl FsCreate for Null {
//!     fn create(&self, _: &Context, _: &str) -> Result<Box<dyn FileWrite>, FsError> {
//!         Ok(Box::new(std::io::sink()))
//!     }
//! }
//!
//! let fsys: SharedFs = Arc::new(Null);
//! let ctx = Context::background().with_file_mode(0o600);
//! ops::write_file(&ctx, &fsys, "notes.txt", b"hello")?;
//! assert!(ops::read_file(&ctx, &fsys, "notes.txt")?.is_empty());
//! # Ok::<(), FsError>(())
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Fs`] | Minimal contract: open a name for reading |
//! | [`Capabilities`] | Which optional contracts a backend implements |
//! | [`ops`] | Orchestrator entry points with fallbacks |
//! | [`Context`] | Cancellation, deadline, file/dir modes, working directory |
//! | [`FsError`] / [`ErrorKind`] | Error with operation and path context |
//! | [`Metadata`] / [`DirEntry`] | Stat results and listing entries |
//! | [`path`] | Lexical path algebra for Unix, Windows and URL styles |
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FsError>`. Errors carry the operation
//! and the path:
//!
//! ```rust
//! use capfs::{ErrorKind, FsError};
//!
//! let err = FsError::not_supported("rename", "/a");
//! assert_eq!(err.to_string(), "rename: operation not supported: /a");
//! assert_eq!(err.kind(), ErrorKind::NotSupported);
//! ```
//!
//! Only [`ErrorKind::NotSupported`] makes the orchestrator fall back. Every
//! other error is returned as the backend reported it.
//!
//! ---
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` and take `&self`. The orchestrator holds
//! no locks across backend calls. Streaming fallbacks run on a background
//! thread that owns a clone of the [`SharedFs`].
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`FileMode`], and [`FsExtJson`] |

mod archive;
mod context;
mod error;
mod ext;
mod traits;
mod types;

pub mod ops;
pub mod path;

// Public re-exports - errors and configuration
pub use context::{CancelHandle, Context, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
pub use error::{ErrorKind, FsError};

// Public re-exports - core types
pub use types::{DirEntry, FileMode, FileType, Metadata};

// Public re-exports - contracts
pub use traits::{
    Capabilities, FileRead, FileWrite, Fs, FsAbs, FsAppend, FsChmod, FsChown, FsChtimes,
    FsClose, FsCreate, FsDirAppend, FsDirRead, FsDirTruncate, FsGlob, FsLocalize, FsMkdir,
    FsMkdirAll, FsReadDir, FsReadlink, FsRel, FsRemove, FsRemoveAll, FsRename, FsStat,
    FsSymlink, FsTempDir, FsTempFile, FsTruncate, FsWalk, ReadDirIter,
};

// Public re-exports - orchestration
pub use ext::FsExt;
pub use ops::SharedFs;

// Conditional re-exports
#[cfg(feature = "serde")]
pub use ext::FsExtJson;
