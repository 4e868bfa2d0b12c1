//! # Extension Traits
//!
//! Convenience methods on a [`SharedFs`].
//!
//! ## Overview
//!
//! [`FsExt`] wraps common call sequences of the [`ops`] orchestrator so
//! callers holding a shared backend can write `fsys.read_file(&ctx, name)`.
//! Every method goes through the orchestrator and gets its fallbacks.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`read_file`](FsExt::read_file) | Read the whole content |
//! | [`write_file`](FsExt::write_file) | Replace the whole content |
//! | [`exists`](FsExt::exists) | Check if a name exists |
//! | [`is_file`](FsExt::is_file) | Check if a name is a regular file |
//! | [`is_dir`](FsExt::is_dir) | Check if a name is a directory |
//! | [`file_size`](FsExt::file_size) | Size in bytes |
//!
//! ## JSON Support (Feature-Gated)
//!
//! With the `serde` feature enabled, [`FsExtJson`] adds `read_json` and
//! `write_json`.
//!
//! Enable with:
//! ```toml
//! [dependencies]
//! capfs = { version = "0.1", features = ["serde"] }
//! ```

use crate::ops::{self, SharedFs};
use crate::{Context, FsError, Metadata};

/// Extension methods for a shared backend.
///
/// # Example
///
/// ```rust
/// use capfs::{Context, FsError, FsExt, SharedFs};
///
/// fn load_or_default(fsys: &SharedFs, ctx: &Context) -> Result<Vec<u8>, FsError> {
///     if fsys.exists(ctx, "settings.toml")? {
///         fsys.read_file(ctx, "settings.toml")
///     } else {
///         Ok(Vec::new())
///     }
/// }
/// ```
pub trait FsExt {
    /// Read the whole content of `name`.
    fn read_file(&self, ctx: &Context, name: &str) -> Result<Vec<u8>, FsError>;

    /// Replace the content of `name` with `data`, creating it if needed.
    fn write_file(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<(), FsError>;

    /// Stat `name`, mapping not-found to `None`.
    fn try_stat(&self, ctx: &Context, name: &str) -> Result<Option<Metadata>, FsError>;

    /// Check if `name` exists.
    ///
    /// Returns `Ok(false)` if it doesn't exist (not an error).
    fn exists(&self, ctx: &Context, name: &str) -> Result<bool, FsError> {
        Ok(self.try_stat(ctx, name)?.is_some())
    }

    /// Check if `name` is a regular file. `Ok(false)` if missing.
    fn is_file(&self, ctx: &Context, name: &str) -> Result<bool, FsError> {
        Ok(self.try_stat(ctx, name)?.is_some_and(|m| m.is_file()))
    }

    /// Check if `name` is a directory. `Ok(false)` if missing.
    fn is_dir(&self, ctx: &Context, name: &str) -> Result<bool, FsError> {
        Ok(self.try_stat(ctx, name)?.is_some_and(|m| m.is_dir()))
    }

    /// Size of `name` in bytes.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotFound`] if `name` does not exist
    fn file_size(&self, ctx: &Context, name: &str) -> Result<u64, FsError> {
        self.try_stat(ctx, name)?
            .map(|m| m.size)
            .ok_or_else(|| FsError::not_found("file_size", name))
    }
}

impl FsExt for SharedFs {
    fn read_file(&self, ctx: &Context, name: &str) -> Result<Vec<u8>, FsError> {
        ops::read_file(ctx, self, name)
    }

    fn write_file(&self, ctx: &Context, name: &str, data: &[u8]) -> Result<(), FsError> {
        ops::write_file(ctx, self, name, data)
    }

    fn try_stat(&self, ctx: &Context, name: &str) -> Result<Option<Metadata>, FsError> {
        match ops::stat(ctx, self, name) {
            Ok(meta) => Ok(Some(meta)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }
}

#[cfg(feature = "serde")]
mod json {
    use super::*;
    use serde::{Serialize, de::DeserializeOwned};

    /// JSON serialization extension methods.
    ///
    /// Available when the `serde` feature is enabled.
    pub trait FsExtJson: FsExt {
        /// Read `name` and deserialize it as JSON.
        ///
        /// # Errors
        ///
        /// - [`FsError::NotFound`] if `name` doesn't exist
        /// - [`FsError::InvalidArgument`] if the content is not valid JSON for `T`
        fn read_json<T: DeserializeOwned>(&self, ctx: &Context, name: &str) -> Result<T, FsError> {
            let data = self.read_file(ctx, name)?;
            serde_json::from_slice(&data).map_err(|e| FsError::invalid("read_json", name, e.to_string()))
        }

        /// Serialize `value` as pretty-printed JSON and write it to `name`.
        fn write_json<T: Serialize>(&self, ctx: &Context, name: &str, value: &T) -> Result<(), FsError> {
            let json = serde_json::to_vec_pretty(value)
                .map_err(|e| FsError::invalid("write_json", name, e.to_string()))?;
            self.write_file(ctx, name, &json)
        }
    }

    impl<E: FsExt + ?Sized> FsExtJson for E {}
}

#[cfg(feature = "serde")]
pub use json::FsExtJson;
