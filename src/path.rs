//! # Path Algebra
//!
//! Pure, lexical path functions. Nothing here touches a backend.
//!
//! Every function detects the style of its own input on each call:
//!
//! | Style | Detected by | Separator | Root |
//! |-------|-------------|-----------|------|
//! | [`Style::Url`] | `://` anywhere | `/` | `scheme://host/` |
//! | [`Style::Windows`] | `X:` + separator, or any `\` | `\` (accepts `/`) | `X:\` or `\` |
//! | [`Style::Unix`] | otherwise | `/` | `/` |
//!
//! A trailing separator marks a directory and survives [`clean`] and
//! [`join`]. A leading `./` (or `.\`) marks an explicitly local path and
//! survives [`clean`] as well.
//!
//! ```rust
//! use capfs::path;
//!
//! assert_eq!(path::join(&["a", "b", ""]), "a/b/");
//! assert_eq!(path::clean("s3://bucket/x/../y"), "s3://bucket/y");
//! assert_eq!(path::clean(r"C:\tmp\..\..\win"), r"C:\win");
//! assert_eq!(path::split("/etc/hosts"), ("/etc".to_string(), "hosts".to_string()));
//! ```

use crate::FsError;

/// Path style, detected per call from the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Forward-slash paths rooted at `/`.
    Unix,
    /// Drive-letter or backslash paths.
    Windows,
    /// `scheme://host/...` paths.
    Url,
}

impl Style {
    /// The separator this style emits.
    pub const fn separator(self) -> char {
        match self {
            Style::Windows => '\\',
            Style::Unix | Style::Url => '/',
        }
    }

    /// Returns `true` if `c` separates elements in this style.
    pub const fn is_separator(self, c: char) -> bool {
        match self {
            Style::Windows => c == '\\' || c == '/',
            Style::Unix | Style::Url => c == '/',
        }
    }
}

/// Detect the style of `p`.
pub fn detect(p: &str) -> Style {
    if p.contains("://") {
        Style::Url
    } else if has_drive(p) || p.contains('\\') {
        Style::Windows
    } else {
        Style::Unix
    }
}

fn has_drive(p: &str) -> bool {
    let b = p.as_bytes();
    b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && (b[2] == b'/' || b[2] == b'\\')
}

/// Normalized root and the remainder with leading separators removed.
fn split_root(p: &str, style: Style) -> (String, &str) {
    let is_sep = |c: char| style.is_separator(c);
    match style {
        Style::Unix => match p.strip_prefix('/') {
            Some(rest) => ("/".to_string(), rest.trim_start_matches(is_sep)),
            None => (String::new(), p),
        },
        Style::Windows => {
            if has_drive(p) {
                let mut root = p[..2].to_string();
                root.push('\\');
                (root, p[3..].trim_start_matches(is_sep))
            } else if p.starts_with(is_sep) {
                ("\\".to_string(), p.trim_start_matches(is_sep))
            } else {
                (String::new(), p)
            }
        }
        Style::Url => {
            let after = p.find("://").map_or(0, |i| i + 3);
            match p[after..].find('/') {
                Some(j) => {
                    let mut root = p[..after + j].to_string();
                    root.push('/');
                    (root, p[after + j..].trim_start_matches(is_sep))
                }
                None => {
                    let mut root = p.to_string();
                    root.push('/');
                    (root, "")
                }
            }
        }
    }
}

/// Lexically clean a path.
///
/// Collapses repeated separators, resolves `.` and `..`, never lets `..`
/// climb above a root, keeps a leading `./` marker and a trailing separator.
/// The empty path cleans to `.`.
///
/// `clean(clean(p)) == clean(p)`.
pub fn clean(p: &str) -> String {
    let style = detect(p);
    let sep = style.separator();
    let (root, rest) = split_root(p, style);

    let mut chars = rest.chars();
    let marker = root.is_empty()
        && chars.next() == Some('.')
        && chars.next().is_some_and(|c| style.is_separator(c));
    let trailing = rest.ends_with(|c| style.is_separator(c));

    let mut parts: Vec<&str> = Vec::new();
    for part in rest.split(|c| style.is_separator(c)) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if root.is_empty() {
                    parts.push("..");
                }
            }
            _ => parts.push(part),
        }
    }

    let mut out = root;
    if parts.is_empty() {
        if out.is_empty() {
            out.push('.');
            if trailing {
                out.push(sep);
            }
        }
        return out;
    }
    if marker && parts[0] != ".." {
        out.push('.');
        out.push(sep);
    }
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        out.push_str(part);
    }
    if trailing {
        out.push(sep);
    }
    out
}

/// Join elements into one cleaned path.
///
/// Empty elements are skipped, except that a trailing empty element forces
/// a trailing separator. Joining nothing but empty elements yields `""`.
pub fn join(elems: &[&str]) -> String {
    let style = elems
        .iter()
        .map(|e| detect(e))
        .find(|s| *s != Style::Unix)
        .unwrap_or(Style::Unix);
    let sep = style.separator();

    let mut buf = String::new();
    for elem in elems.iter().filter(|e| !e.is_empty()) {
        if !buf.is_empty() && !buf.ends_with(|c| style.is_separator(c)) {
            buf.push(sep);
        }
        buf.push_str(elem);
    }
    if buf.is_empty() {
        return buf;
    }
    if elems.len() > 1 && elems.last().is_some_and(|e| e.is_empty()) {
        buf.push(sep);
    }
    clean(&buf)
}

/// Split into directory and base.
///
/// The directory carries no trailing separator unless it is a root. A
/// trailing separator on `p` stays on the base, so joining the two halves
/// gives back the cleaned input.
pub fn split(p: &str) -> (String, String) {
    let style = detect(p);
    let (root, rest) = split_root(p, style);
    let trailing = rest.ends_with(|c| style.is_separator(c));
    let body = rest.trim_end_matches(|c| style.is_separator(c));
    if body.is_empty() {
        return (root, String::new());
    }

    let (dir, mut base) = match body.rfind(|c| style.is_separator(c)) {
        Some(i) => {
            let mut dir = root;
            dir.push_str(body[..i].trim_end_matches(|c| style.is_separator(c)));
            (dir, body[i + 1..].to_string())
        }
        None => (root, body.to_string()),
    };
    if trailing {
        base.push(style.separator());
    }
    (dir, base)
}

/// Last element of the path, ignoring a trailing separator.
///
/// Returns the root for a root path and `.` for an empty one.
pub fn base(p: &str) -> String {
    let style = detect(p);
    let (root, rest) = split_root(p, style);
    let body = rest.trim_end_matches(|c| style.is_separator(c));
    if body.is_empty() {
        return if root.is_empty() { ".".to_string() } else { root };
    }
    match body.rfind(|c| style.is_separator(c)) {
        Some(i) => body[i + 1..].to_string(),
        None => body.to_string(),
    }
}

/// Everything but the last element, cleaned. `.` when there is no directory.
pub fn dir(p: &str) -> String {
    let (dir, _) = split(p);
    if dir.is_empty() {
        ".".to_string()
    } else {
        clean(&dir)
    }
}

/// Returns `true` if the path ends with a separator (directory marker).
pub fn is_dir(p: &str) -> bool {
    let style = detect(p);
    p.ends_with(|c| style.is_separator(c))
}

/// Returns `true` if the path is absolute in its style.
pub fn is_abs(p: &str) -> bool {
    match detect(p) {
        Style::Url => true,
        Style::Unix => p.starts_with('/'),
        Style::Windows => has_drive(p) || p.starts_with(['\\', '/']),
    }
}

/// Returns `true` if the path names a root once cleaned.
pub fn is_root(p: &str) -> bool {
    let cleaned = clean(p);
    let (root, rest) = split_root(&cleaned, detect(&cleaned));
    !root.is_empty() && rest.is_empty()
}

/// Lexical path of `target` relative to `base`.
///
/// Both must be absolute (with the same root) or both relative. A trailing
/// separator on `target` is kept.
pub fn rel(base: &str, target: &str) -> Result<String, FsError> {
    let b = clean(base);
    let t = clean(target);
    let b_style = detect(&b);
    let t_style = detect(&t);
    let (b_root, b_rest) = split_root(&b, b_style);
    let (t_root, t_rest) = split_root(&t, t_style);

    if is_abs(&b) != is_abs(&t) || b_root != t_root {
        return Err(FsError::invalid(
            "rel",
            target,
            format!("cannot make relative to {base}"),
        ));
    }

    let elements = |rest: &str, style: Style| -> Vec<String> {
        rest.split(|c| style.is_separator(c))
            .filter(|part| !part.is_empty() && *part != ".")
            .map(str::to_string)
            .collect()
    };
    let b_parts = elements(b_rest, b_style);
    let t_parts = elements(t_rest, t_style);

    let common = b_parts
        .iter()
        .zip(&t_parts)
        .take_while(|(a, b)| a == b)
        .count();
    if b_parts[common..].iter().any(|part| part == "..") {
        return Err(FsError::invalid(
            "rel",
            target,
            format!("cannot make relative to {base}"),
        ));
    }

    let sep = t_style.separator();
    let mut out: Vec<&str> = Vec::new();
    out.extend(std::iter::repeat_n("..", b_parts.len() - common));
    out.extend(t_parts[common..].iter().map(String::as_str));
    let mut joined = if out.is_empty() {
        ".".to_string()
    } else {
        out.join(&sep.to_string())
    };
    if is_dir(&t) && !is_root(&t) {
        joined.push(sep);
    }
    Ok(joined)
}

/// Returns `true` if `pattern` holds shell glob meta characters.
pub(crate) fn has_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
