//! The minimal contract and read-side capabilities.

use std::io::Read;

use super::Capabilities;
use crate::{Context, FsError, Metadata};

/// The minimal filesystem contract: open a named resource for reading.
///
/// Every backend implements `Fs`. Anything beyond reading is advertised by
/// implementing one of the optional capability traits and listing it in
/// [`capabilities`](Fs::capabilities).
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent access. Backends use interior mutability (`RwLock`, `Mutex`)
/// for their own state.
///
/// # Object Safety
///
/// This trait is object-safe; the orchestrator works on `Arc<dyn Fs>`.
///
/// # Example
///
/// ```rust
/// use capfs::{Capabilities, Context, FileRead, Fs, FsError, FsStat, Metadata};
///
/// struct HelloFs;
///
/// impl Fs for HelloFs {
///     fn open(&self, _ctx: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError> {
///         match name {
///             "hello.txt" => Ok(Box::new(std::io::Cursor::new(b"hello".to_vec()))),
///             _ => Err(FsError::not_found("open", name)),
///         }
///     }
///
///     fn capabilities(&self) -> Capabilities<'_> {
///         Capabilities::new().with_stat(self)
///     }
/// }
///
/// impl FsStat for HelloFs {
///     fn stat(&self, _ctx: &Context, name: &str) -> Result<Metadata, FsError> {
///         match name {
///             "hello.txt" => Ok(Metadata { name: name.into(), size: 5, ..Default::default() }),
///             _ => Err(FsError::not_found("stat", name)),
///         }
///     }
/// }
/// ```
pub trait Fs: Send + Sync {
    /// Open a resource for reading.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the name does not exist
    /// - [`FsError::NotSupported`] if the backend cannot read it
    fn open(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError>;

    /// Describe which optional contracts this backend implements.
    ///
    /// The default advertises nothing beyond [`open`](Fs::open).
    fn capabilities(&self) -> Capabilities<'_> {
        Capabilities::new()
    }
}

/// Metadata lookup.
pub trait FsStat: Fs {
    /// Get metadata for a name (follows symlinks).
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if the name does not exist
    fn stat(&self, ctx: &Context, name: &str) -> Result<Metadata, FsError>;
}

/// Backend shutdown.
///
/// The caller owns the backend lifecycle; the orchestrator never closes a
/// backend on its own.
pub trait FsClose: Fs {
    /// Release backend resources (connections, mounts).
    fn close(&self, ctx: &Context) -> Result<(), FsError>;
}

/// A readable resource handle.
///
/// Closing consumes the handle, so it happens at most once.
pub trait FileRead: Read + Send {
    /// Close the handle.
    fn close(self: Box<Self>) -> Result<(), FsError> {
        Ok(())
    }

    /// Backend-native path of the resource, if the backend localizes names.
    fn native_path(&self) -> Option<&str> {
        None
    }
}

impl FileRead for std::io::Cursor<Vec<u8>> {}

impl FileRead for std::io::Empty {}
