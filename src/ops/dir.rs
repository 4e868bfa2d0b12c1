//! Directory operations: listing, walking, creating and removing.

use std::collections::VecDeque;
use std::sync::Arc;

use super::{SharedFs, native};
use crate::{Context, DirEntry, ErrorKind, FsError, ReadDirIter, path};

/// List the direct children of `name`.
///
/// Falls back to a native walk limited to depth 1. There is no fallback
/// built on [`walk`], since the walk fallback lists directories itself.
pub fn read_dir(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<ReadDirIter, FsError> {
    ctx.check("read_dir")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("read_dir", name, caps.read_dir(), |r| r.read_dir(ctx, name)) {
        return result;
    }
    if let Some(result) = native("read_dir", name, caps.walk(), |w| w.walk(ctx, name, 1)) {
        return result.map(|entries| {
            ReadDirIter::new(entries.map(|entry| {
                entry.map(|mut entry| {
                    entry.path = None;
                    entry
                })
            }))
        });
    }
    Err(FsError::not_supported("read_dir", name))
}

/// Walk below `root`, breadth first.
///
/// `depth == 0` is unlimited, otherwise entries at most `depth` levels
/// below `root` are yielded. Each entry's `path` is relative to `root`.
/// Entries of one directory come in name order. Symlinks are yielded but
/// never entered.
///
/// The root is listed before this returns, so a missing root is reported
/// here rather than by the iterator.
pub fn walk(ctx: &Context, fsys: &SharedFs, root: &str, depth: usize) -> Result<ReadDirIter, FsError> {
    ctx.check("walk")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("walk", root, caps.walk(), |w| w.walk(ctx, root, depth)) {
        return result;
    }
    let mut walker = Walker {
        ctx: ctx.clone(),
        fsys: Arc::clone(fsys),
        root: root.to_string(),
        depth,
        queue: VecDeque::new(),
        pending: Vec::new().into_iter(),
    };
    walker.pending = walker.list("", 1)?.into_iter();
    Ok(ReadDirIter::new(walker))
}

struct Walker {
    ctx: Context,
    fsys: SharedFs,
    root: String,
    depth: usize,
    /// Directories still to list: walk-relative path and the level of their children.
    queue: VecDeque<(String, usize)>,
    pending: std::vec::IntoIter<DirEntry>,
}

impl Walker {
    fn list(&mut self, rel: &str, level: usize) -> Result<Vec<DirEntry>, FsError> {
        let dir = if rel.is_empty() {
            self.root.clone()
        } else {
            path::join(&[&self.root, rel])
        };
        let mut entries = read_dir(&self.ctx, &self.fsys, &dir)?.collect_all()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in &mut entries {
            let entry_path = if rel.is_empty() {
                entry.name.clone()
            } else {
                path::join(&[rel, &entry.name])
            };
            if entry.is_dir() && (self.depth == 0 || level < self.depth) {
                self.queue.push_back((entry_path.clone(), level + 1));
            }
            entry.path = Some(entry_path);
        }
        Ok(entries)
    }
}

impl Iterator for Walker {
    type Item = Result<DirEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.pending.next() {
                return Some(Ok(entry));
            }
            let (rel, level) = self.queue.pop_front()?;
            if let Err(error) = self.ctx.check("walk") {
                self.queue.clear();
                return Some(Err(error));
            }
            match self.list(&rel, level) {
                Ok(entries) => self.pending = entries.into_iter(),
                Err(error) => return Some(Err(error)),
            }
        }
    }
}

/// Create directory `name` with `ctx.dir_mode()`.
pub fn mkdir(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<(), FsError> {
    ctx.check("mkdir")?;
    match fsys.capabilities().mkdir() {
        Some(m) => m.mkdir(ctx, name),
        None => Err(FsError::not_supported("mkdir", name)),
    }
}

/// Create `name` and any missing parents. An existing directory is fine.
///
/// # Errors
///
/// - [`FsError::NotADirectory`] if `name` exists and is not a directory
pub fn mkdir_all(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<(), FsError> {
    ctx.check("mkdir_all")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("mkdir_all", name, caps.mkdir_all(), |m| m.mkdir_all(ctx, name)) {
        return result;
    }

    match super::stat(ctx, fsys, name) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(FsError::NotADirectory {
                operation: "mkdir_all",
                path: name.to_string(),
            });
        }
        Err(error) if error.is_not_found() || error.is_not_supported() => {}
        Err(error) => return Err(error),
    }

    let error = match mkdir(ctx, fsys, name) {
        Ok(()) => return Ok(()),
        Err(error) => match error.kind() {
            ErrorKind::AlreadyExists => return Ok(()),
            ErrorKind::NotSupported => return Err(error),
            _ => error,
        },
    };

    let parent = path::dir(name);
    if parent == "." || path::is_root(&parent) || parent == path::clean(name) {
        return Err(error);
    }
    tracing::debug!(path = name, parent = %parent, "creating parent directory");
    mkdir_all(ctx, fsys, &parent)?;
    match mkdir(ctx, fsys, name) {
        Err(error) if error.kind() == ErrorKind::AlreadyExists => Ok(()),
        result => result,
    }
}

/// Remove a file or an empty directory.
pub fn remove(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<(), FsError> {
    ctx.check("remove")?;
    match fsys.capabilities().remove() {
        Some(r) => r.remove(ctx, name),
        None => Err(FsError::not_supported("remove", name)),
    }
}

/// Remove `name` and everything below it. A missing `name` is not an error.
pub fn remove_all(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<(), FsError> {
    ctx.check("remove_all")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("remove_all", name, caps.remove_all(), |r| r.remove_all(ctx, name)) {
        return result;
    }

    match remove(ctx, fsys, name) {
        Ok(()) => return Ok(()),
        Err(error) if error.is_not_found() => return Ok(()),
        Err(error) if error.kind() == ErrorKind::DirectoryNotEmpty => {}
        Err(error) => return Err(error),
    }

    for child in read_dir(ctx, fsys, name)?.collect_all()? {
        remove_all(ctx, fsys, &path::join(&[name, &child.name]))?;
    }
    match remove(ctx, fsys, name) {
        Err(error) if error.is_not_found() => Ok(()),
        result => result,
    }
}

/// Remove the contents of directory `name`, keeping the directory.
pub(crate) fn truncate_dir(ctx: &Context, fsys: &SharedFs, name: &str) -> Result<(), FsError> {
    ctx.check("truncate_dir")?;
    let caps = fsys.capabilities();
    if let Some(result) = native("truncate_dir", name, caps.dir_truncate(), |t| {
        t.truncate_dir(ctx, name)
    }) {
        return result;
    }
    for child in read_dir(ctx, fsys, name)?.collect_all()? {
        remove_all(ctx, fsys, &path::join(&[name, &child.name]))?;
    }
    Ok(())
}
