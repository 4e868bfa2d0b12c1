//! # Fallback Orchestrator
//!
//! Backend-agnostic entry points for every filesystem operation.
//!
//! Each function takes the request [`Context`] and the backend as a
//! [`SharedFs`]. It checks the context, calls the native contract when the
//! backend advertises it, and otherwise synthesizes the operation from
//! simpler contracts. A native call that fails with
//! [`ErrorKind::NotSupported`](crate::ErrorKind::NotSupported) is treated
//! like an absent contract. Any other result is returned unchanged.
//!
//! | Operation | Fallback |
//! |-----------|----------|
//! | [`append`] | read old content, create, stream old then new bytes |
//! | [`create`] / [`append`] | on not-found, create parents and retry once |
//! | [`rename`] | copy then remove, no undo |
//! | [`truncate`] | remove and recreate with the kept prefix |
//! | [`remove_all`] | remove children depth-first |
//! | [`mkdir_all`] | mkdir each missing ancestor |
//! | [`read_dir`] | native walk at depth 1 |
//! | [`walk`] | breadth-first over [`read_dir`] |
//! | [`glob`] | stat or directory listing + shell patterns |
//! | [`abs`], [`rel`], [`localize`] | lexical [`path`](crate::path) functions |
//! | [`temp_file`] / [`temp_dir`] | random name + create / mkdir |
//!
//! Names with a trailing separator, or names that stat as directories, are
//! handled as bulk-directory tar streams by [`open`], [`create`],
//! [`append`] and [`truncate`].
//!
//! ```rust
//! use std::sync::Arc;
//! use capfs::{ops, Capabilities, Context, FileRead, Fs, FsError, SharedFs};
//!
//! struct Static;
//!
//! impl Fs for Static {
//!     fn open(&self, _: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError> {
//!         Ok(Box::new(std::io::Cursor::new(name.as_bytes().to_vec())))
//!     }
//! }
//!
//! let fsys: SharedFs = Arc::new(Static);
//! let ctx = Context::background();
//! assert_eq!(ops::read_file(&ctx, &fsys, "echo").unwrap(), b"echo");
//! assert!(ops::mkdir(&ctx, &fsys, "d").unwrap_err().is_not_supported());
//! ```

use std::sync::Arc;

use crate::{Context, Fs, FsError, path};

mod dir;
mod file;
mod meta;
mod paths;
mod temp;

pub use dir::{mkdir, mkdir_all, read_dir, remove, remove_all, walk};
pub use file::{append, create, open, read_file, rename, truncate, write_file};
pub use meta::{chmod, chown, chtimes, close, readlink, stat, symlink};
pub use paths::{abs, glob, localize, rel};
pub use temp::{TEMP_DIR_MODE, temp_dir, temp_file};

pub(crate) use dir::truncate_dir;

/// A backend shared between the caller and streaming threads.
pub type SharedFs = Arc<dyn Fs>;

/// Call the native contract if the backend advertises it.
///
/// `None` means the caller should run its fallback: the contract is absent
/// or it answered `NotSupported`.
fn native<C: ?Sized, T>(
    operation: &'static str,
    name: &str,
    contract: Option<&C>,
    call: impl FnOnce(&C) -> Result<T, FsError>,
) -> Option<Result<T, FsError>> {
    let Some(contract) = contract else {
        tracing::debug!(operation, path = name, "capability absent, using fallback");
        return None;
    };
    match call(contract) {
        Err(error) if error.is_not_supported() => {
            tracing::debug!(operation, path = name, "native call not supported, using fallback");
            None
        }
        result => Some(result),
    }
}

/// Returns `true` if `name` has a trailing separator or stats as a directory.
fn is_directory(ctx: &Context, fsys: &SharedFs, name: &str) -> bool {
    path::is_dir(name) || stat(ctx, fsys, name).is_ok_and(|meta| meta.is_dir())
}

/// Cleaned directory name without its trailing separator.
fn dir_name(name: &str) -> String {
    let cleaned = path::clean(name);
    if path::is_root(&cleaned) {
        return cleaned;
    }
    let trimmed = cleaned.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        ".".to_string()
    } else {
        trimmed.to_string()
    }
}
