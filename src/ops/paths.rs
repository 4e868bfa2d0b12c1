//! Name resolution: abs, rel, localize, glob.

use glob::{MatchOptions, Pattern};

use super::{SharedFs, native};
use crate::{Context, FsError, path};

/// Patterns with more separators than this are rejected.
const MAX_GLOB_SEPARATORS: usize = 10_000;

/// Absolute form of `name`.
///
/// Without a native resolver, an absolute `name` is cleaned and a relative
/// one is joined onto `ctx.work_dir()` when that is absolute. Anything else
/// is `NotSupported`, even though some backends can resolve it natively.
pub fn abs(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<String, FsError> {
    ctx.check("abs")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("abs", name, caps.abs(), |a| a.abs(ctx, name)) {
        return result;
    }
    if path::is_abs(name) {
        return Ok(path::clean(name));
    }
    let work_dir = ctx.work_dir();
    if path::is_abs(work_dir) {
        return Ok(path::join(&[work_dir, name]));
    }
    Err(FsError::not_supported("abs", name))
}

/// Path of `target` relative to `base`.
pub fn rel(ctx: &Context, fsys: &SharedFs, base: &str, target: &str) -> Result<String, FsError> {
    ctx.check("rel")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("rel", target, caps.rel(), |r| r.rel(ctx, base, target)) {
        return result;
    }
    path::rel(base, target)
}

/// Backend-native form of `name`. Identity without a native localizer.
pub fn localize(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<String, FsError> {
    ctx.check("localize")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("localize", name, caps.localize(), |l| l.localize(ctx, name)) {
        return result;
    }
    Ok(name.to_string())
}

/// Names matching the shell-style `pattern`, sorted.
///
/// No match is an empty result. Each path segment is matched separately,
/// so `*` never crosses a separator.
///
/// # Errors
///
/// - [`FsError::InvalidArgument`] for a malformed pattern or one with more
///   than 10,000 separators
pub fn glob(ctx: &Context, fsys: &SharedFs, pattern: &str) -> Result<Vec<String>, FsError> {
    ctx.check("glob")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("glob", pattern, caps.glob(), |g| g.glob(ctx, pattern)) {
        return result;
    }
    let separators = pattern.chars().filter(|c| matches!(c, '/' | '\\')).count();
    if separators > MAX_GLOB_SEPARATORS {
        return Err(FsError::invalid("glob", pattern, "too many path separators"));
    }
    let mut matches = glob_fallback(ctx, fsys, pattern)?;
    matches.sort();
    Ok(matches)
}

fn glob_fallback(ctx: &Context, fsys: &SharedFs, pattern: &str) -> Result<Vec<String>, FsError> {
    if !path::has_meta(pattern) {
        return match super::stat(ctx, fsys, pattern) {
            Ok(_) => Ok(vec![pattern.to_string()]),
            Err(error) if error.is_not_found() => Ok(Vec::new()),
            Err(error) => Err(error),
        };
    }

    let (dir, file) = path::split(pattern);
    let dir = dir.trim_end_matches(['/', '\\']);
    let dir = if dir.is_empty() && !pattern.starts_with(['/', '\\']) {
        "."
    } else if dir.is_empty() {
        "/"
    } else {
        dir
    };
    let matcher = Pattern::new(file.trim_end_matches(['/', '\\']))
        .map_err(|e| FsError::invalid("glob", pattern, e.to_string()))?;

    let dirs = if path::has_meta(dir) {
        glob_fallback(ctx, fsys, dir)?
    } else {
        vec![dir.to_string()]
    };

    let mut matches = Vec::new();
    for dir in dirs {
        match_dir(ctx, fsys, &dir, &matcher, pattern, &mut matches)?;
    }
    Ok(matches)
}

fn match_dir(
    ctx: &Context,
    fsys: &SharedFs,
    dir: &str,
    matcher: &Pattern,
    pattern: &str,
    matches: &mut Vec<String>,
) -> Result<(), FsError> {
    let entries = match super::read_dir(ctx, fsys, dir) {
        Ok(entries) => entries.collect_all()?,
        // A non-directory or vanished directory just matches nothing.
        Err(error) if error.is_not_found() || error.kind() == crate::ErrorKind::NotADirectory => {
            return Ok(());
        }
        Err(error) => return Err(error),
    };
    let options = MatchOptions {
        require_literal_separator: true,
        ..MatchOptions::new()
    };
    let relative = !pattern.starts_with("./") && !pattern.starts_with(".\\");
    for entry in entries {
        if matcher.matches_with(&entry.name, options) {
            let joined = match (dir, relative) {
                (".", true) => entry.name,
                (".", false) => format!("./{}", entry.name),
                _ => path::join(&[dir, &entry.name]),
            };
            matches.push(joined);
        }
    }
    Ok(())
}
