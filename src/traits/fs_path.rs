//! # Path Resolution Capabilities
//!
//! Backends that know more about their namespace than the lexical
//! [`path`](crate::path) functions can override how names are resolved,
//! related, localized and matched.
//!
//! | Trait | Fallback in [`ops`](crate::ops) |
//! |-------|----------------------|
//! | [`FsAbs`] | join onto an absolute `ctx.work_dir()` |
//! | [`FsRel`] | [`path::rel`](crate::path::rel) |
//! | [`FsLocalize`] | identity |
//! | [`FsGlob`] | stat / directory listing + shell patterns |

use crate::{Context, Fs, FsError};

/// Absolute path resolution.
pub trait FsAbs: Fs {
    /// Resolve `name` to an absolute path.
    fn abs(&self, ctx: &Context, name: &str) -> Result<String, FsError>;
}

/// Relative path computation.
pub trait FsRel: Fs {
    /// Path of `target` relative to `base`.
    fn rel(&self, ctx: &Context, base: &str, target: &str) -> Result<String, FsError>;
}

/// Conversion to the backend's native path form.
///
/// Implementations must be idempotent:
/// `localize(localize(p)) == localize(p)`.
pub trait FsLocalize: Fs {
    /// Convert a forward-slash name to the backend-native representation.
    fn localize(&self, ctx: &Context, name: &str) -> Result<String, FsError>;
}

/// Native pattern matching.
pub trait FsGlob: Fs {
    /// Names matching the shell-style `pattern`, sorted. No match is an
    /// empty result, not an error.
    ///
    /// # Errors
    ///
    /// - [`FsError::InvalidArgument`] if the pattern is malformed
    fn glob(&self, ctx: &Context, pattern: &str) -> Result<Vec<String>, FsError>;
}
