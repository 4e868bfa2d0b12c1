//! In-memory backend shared by the integration tests.
//!
//! `MemFs` implements most contracts. Which of them it advertises is
//! chosen per test, so the same tree can be driven through native calls or
//! through the orchestrator's fallbacks.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use capfs::*;

/// One optional contract of [`MemFs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cap {
    Stat,
    Close,
    Create,
    Append,
    Truncate,
    Remove,
    RemoveAll,
    Rename,
    ReadDir,
    Walk,
    Mkdir,
    MkdirAll,
    Symlink,
    Readlink,
    Chmod,
    Abs,
    Localize,
}

impl Cap {
    pub const ALL: [Cap; 17] = [
        Cap::Stat,
        Cap::Close,
        Cap::Create,
        Cap::Append,
        Cap::Truncate,
        Cap::Remove,
        Cap::RemoveAll,
        Cap::Rename,
        Cap::ReadDir,
        Cap::Walk,
        Cap::Mkdir,
        Cap::MkdirAll,
        Cap::Symlink,
        Cap::Readlink,
        Cap::Chmod,
        Cap::Abs,
        Cap::Localize,
    ];

    /// The smallest set every fallback can be built from.
    pub const BASIC: [Cap; 7] = [
        Cap::Stat,
        Cap::Create,
        Cap::Remove,
        Cap::ReadDir,
        Cap::Mkdir,
        Cap::Symlink,
        Cap::Readlink,
    ];
}

#[derive(Debug, Clone)]
enum Node {
    File {
        data: Vec<u8>,
        mode: u32,
        modified: SystemTime,
    },
    Dir {
        mode: u32,
    },
    Symlink {
        target: String,
    },
}

impl Node {
    fn mode(&self) -> FileMode {
        match self {
            Node::File { mode, .. } => FileMode::from_perm(*mode),
            Node::Dir { mode } => FileMode::dir(*mode),
            Node::Symlink { .. } => FileMode::symlink(0o777),
        }
    }
}

type Tree = Arc<RwLock<BTreeMap<String, Node>>>;

/// In-memory tree behind one lock. The root is the empty key.
pub struct MemFs {
    tree: Tree,
    caps: BTreeSet<Cap>,
    unsupported: BTreeSet<Cap>,
    closed: AtomicBool,
}

impl MemFs {
    /// Advertises every contract.
    pub fn full() -> Self {
        Self::with_caps(&Cap::ALL)
    }

    /// Advertises only [`Cap::BASIC`].
    pub fn basic() -> Self {
        Self::with_caps(&Cap::BASIC)
    }

    pub fn with_caps(caps: &[Cap]) -> Self {
        let mut tree = BTreeMap::new();
        tree.insert(String::new(), Node::Dir { mode: 0o755 });
        Self {
            tree: Arc::new(RwLock::new(tree)),
            caps: caps.iter().copied().collect(),
            unsupported: BTreeSet::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Keep advertising `cap` but answer every call with `NotSupported`.
    pub fn refusing(mut self, cap: Cap) -> Self {
        self.unsupported.insert(cap);
        self
    }

    pub fn shared(self) -> SharedFs {
        Arc::new(self)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn gate(&self, cap: Cap, operation: &'static str, name: &str) -> Result<(), FsError> {
        if self.unsupported.contains(&cap) {
            return Err(FsError::not_supported(operation, name));
        }
        Ok(())
    }

    fn check_parent(
        tree: &BTreeMap<String, Node>,
        operation: &'static str,
        name: &str,
        key: &str,
    ) -> Result<(), FsError> {
        match tree.get(parent(key)) {
            Some(Node::Dir { .. }) => Ok(()),
            Some(_) => Err(FsError::NotADirectory {
                operation,
                path: name.to_string(),
            }),
            None => Err(FsError::not_found(operation, name)),
        }
    }

    fn writer(&self, ctx: &Context, name: &str, truncate: bool) -> Result<Box<dyn FileWrite>, FsError> {
        let key = key(name);
        let mut tree = self.tree.write().unwrap();
        Self::check_parent(&tree, "create", name, &key)?;
        match tree.get_mut(&key) {
            Some(Node::Dir { .. }) => {
                return Err(FsError::IsADirectory {
                    operation: "create",
                    path: name.to_string(),
                });
            }
            Some(Node::File { data, modified, .. }) => {
                if truncate {
                    data.clear();
                    *modified = SystemTime::now();
                }
            }
            Some(Node::Symlink { .. }) | None => {
                tree.insert(
                    key.clone(),
                    Node::File {
                        data: Vec::new(),
                        mode: ctx.file_mode().perm(),
                        modified: SystemTime::now(),
                    },
                );
            }
        }
        Ok(Box::new(MemWriter {
            tree: Arc::clone(&self.tree),
            key,
        }))
    }
}

/// Normalized tree key: cleaned, no leading `./` or `/`, no trailing `/`.
pub fn key(name: &str) -> String {
    let cleaned = path::clean(&name.replace('\\', "/"));
    let trimmed = cleaned
        .trim_start_matches("./")
        .trim_start_matches('/')
        .trim_end_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn parent(key: &str) -> &str {
    key.rsplit_once('/').map_or("", |(parent, _)| parent)
}

fn base(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, base)| base)
}

fn children<'a>(tree: &'a BTreeMap<String, Node>, dir: &'a str) -> impl Iterator<Item = (&'a String, &'a Node)> {
    tree.iter()
        .filter(move |(k, _)| !k.is_empty() && parent(k) == dir)
}

/// Follow symlinks, at most eight hops.
fn resolve(tree: &BTreeMap<String, Node>, mut key: String) -> Option<(String, &Node)> {
    for _ in 0..8 {
        match tree.get(&key)? {
            Node::Symlink { target } => {
                key = if target.starts_with('/') {
                    self::key(target)
                } else {
                    self::key(&format!("{}/{}", parent(&key), target))
                };
            }
            node => return Some((key, node)),
        }
    }
    None
}

struct MemWriter {
    tree: Tree,
    key: String,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut tree = self.tree.write().unwrap();
        match tree.get_mut(&self.key) {
            Some(Node::File { data, modified, .. }) => {
                data.extend_from_slice(buf);
                *modified = SystemTime::now();
                Ok(buf.len())
            }
            _ => Err(FsError::Closed {
                operation: "write",
                path: self.key.clone(),
            }
            .into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FileWrite for MemWriter {}

impl Fs for MemFs {
    fn open(&self, _: &Context, name: &str) -> Result<Box<dyn FileRead>, FsError> {
        let tree = self.tree.read().unwrap();
        match resolve(&tree, key(name)) {
            Some((_, Node::File { data, .. })) => Ok(Box::new(Cursor::new(data.clone()))),
            Some(_) => Err(FsError::IsADirectory {
                operation: "open",
                path: name.to_string(),
            }),
            None => Err(FsError::not_found("open", name)),
        }
    }

    fn capabilities(&self) -> Capabilities<'_> {
        let mut caps = Capabilities::new();
        for cap in &self.caps {
            caps = match cap {
                Cap::Stat => caps.with_stat(self),
                Cap::Close => caps.with_close(self),
                Cap::Create => caps.with_create(self),
                Cap::Append => caps.with_append(self),
                Cap::Truncate => caps.with_truncate(self),
                Cap::Remove => caps.with_remove(self),
                Cap::RemoveAll => caps.with_remove_all(self),
                Cap::Rename => caps.with_rename(self),
                Cap::ReadDir => caps.with_read_dir(self),
                Cap::Walk => caps.with_walk(self),
                Cap::Mkdir => caps.with_mkdir(self),
                Cap::MkdirAll => caps.with_mkdir_all(self),
                Cap::Symlink => caps.with_symlink(self),
                Cap::Readlink => caps.with_readlink(self),
                Cap::Chmod => caps.with_chmod(self),
                Cap::Abs => caps.with_abs(self),
                Cap::Localize => caps.with_localize(self),
            };
        }
        caps
    }
}

impl FsStat for MemFs {
    fn stat(&self, _: &Context, name: &str) -> Result<Metadata, FsError> {
        self.gate(Cap::Stat, "stat", name)?;
        let tree = self.tree.read().unwrap();
        let key = key(name);
        let (_, node) = resolve(&tree, key.clone()).ok_or_else(|| FsError::not_found("stat", name))?;
        let (size, modified) = match node {
            Node::File { data, modified, .. } => (data.len() as u64, *modified),
            _ => (0, SystemTime::UNIX_EPOCH),
        };
        Ok(Metadata {
            name: base(&key).to_string(),
            size,
            mode: node.mode(),
            modified,
        })
    }
}

impl FsClose for MemFs {
    fn close(&self, _: &Context) -> Result<(), FsError> {
        self.gate(Cap::Close, "close", "")?;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl FsCreate for MemFs {
    fn create(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileWrite>, FsError> {
        self.gate(Cap::Create, "create", name)?;
        self.writer(ctx, name, true)
    }
}

impl FsAppend for MemFs {
    fn append(&self, ctx: &Context, name: &str) -> Result<Box<dyn FileWrite>, FsError> {
        self.gate(Cap::Append, "append", name)?;
        self.writer(ctx, name, false)
    }
}

impl FsTruncate for MemFs {
    fn truncate(&self, _: &Context, name: &str, size: u64) -> Result<(), FsError> {
        self.gate(Cap::Truncate, "truncate", name)?;
        let mut tree = self.tree.write().unwrap();
        match tree.get_mut(&key(name)) {
            Some(Node::File { data, .. }) => {
                data.resize(size as usize, 0);
                Ok(())
            }
            Some(_) => Err(FsError::IsADirectory {
                operation: "truncate",
                path: name.to_string(),
            }),
            None => Err(FsError::not_found("truncate", name)),
        }
    }
}

impl FsRemove for MemFs {
    fn remove(&self, _: &Context, name: &str) -> Result<(), FsError> {
        self.gate(Cap::Remove, "remove", name)?;
        let mut tree = self.tree.write().unwrap();
        let key = key(name);
        if key.is_empty() {
            return Err(FsError::PermissionDenied {
                operation: "remove",
                path: name.to_string(),
            });
        }
        let is_dir = match tree.get(&key) {
            None => return Err(FsError::not_found("remove", name)),
            Some(node) => matches!(node, Node::Dir { .. }),
        };
        if is_dir && children(&tree, &key).next().is_some() {
            return Err(FsError::DirectoryNotEmpty {
                operation: "remove",
                path: name.to_string(),
            });
        }
        tree.remove(&key);
        Ok(())
    }
}

impl FsRemoveAll for MemFs {
    fn remove_all(&self, _: &Context, name: &str) -> Result<(), FsError> {
        self.gate(Cap::RemoveAll, "remove_all", name)?;
        let mut tree = self.tree.write().unwrap();
        let key = key(name);
        let prefix = format!("{key}/");
        tree.retain(|k, _| k.is_empty() || (k != &key && !(key.is_empty() || k.starts_with(&prefix))));
        Ok(())
    }
}

impl FsRename for MemFs {
    fn rename(&self, _: &Context, from: &str, to: &str) -> Result<(), FsError> {
        self.gate(Cap::Rename, "rename", from)?;
        let mut tree = self.tree.write().unwrap();
        let (src, dst) = (key(from), key(to));
        if !tree.contains_key(&src) {
            return Err(FsError::not_found("rename", from));
        }
        Self::check_parent(&tree, "rename", to, &dst)?;
        let prefix = format!("{src}/");
        let moved: Vec<String> = tree
            .keys()
            .filter(|k| **k == src || k.starts_with(&prefix))
            .cloned()
            .collect();
        for old in moved {
            if let Some(node) = tree.remove(&old) {
                let new = format!("{dst}{}", &old[src.len()..]);
                tree.insert(new, node);
            }
        }
        Ok(())
    }
}

impl FsReadDir for MemFs {
    fn read_dir(&self, _: &Context, name: &str) -> Result<ReadDirIter, FsError> {
        self.gate(Cap::ReadDir, "read_dir", name)?;
        let tree = self.tree.read().unwrap();
        let (dir, node) =
            resolve(&tree, key(name)).ok_or_else(|| FsError::not_found("read_dir", name))?;
        if !matches!(node, Node::Dir { .. }) {
            return Err(FsError::NotADirectory {
                operation: "read_dir",
                path: name.to_string(),
            });
        }
        // Reverse order so callers can't rely on the backend sorting.
        let mut entries: Vec<_> = children(&tree, &dir)
            .map(|(k, node)| Ok(DirEntry::new(base(k), node.mode())))
            .collect();
        entries.reverse();
        Ok(ReadDirIter::from_vec(entries))
    }
}

impl FsWalk for MemFs {
    fn walk(&self, _: &Context, root: &str, depth: usize) -> Result<ReadDirIter, FsError> {
        self.gate(Cap::Walk, "walk", root)?;
        let tree = self.tree.read().unwrap();
        let root_key = key(root);
        match tree.get(&root_key) {
            Some(Node::Dir { .. }) => {}
            Some(_) => {
                return Err(FsError::NotADirectory {
                    operation: "walk",
                    path: root.to_string(),
                });
            }
            None => return Err(FsError::not_found("walk", root)),
        }
        let prefix = if root_key.is_empty() {
            String::new()
        } else {
            format!("{root_key}/")
        };
        let entries: Vec<_> = tree
            .iter()
            .filter(|(k, _)| !k.is_empty() && k.starts_with(&prefix) && **k != root_key)
            .filter_map(|(k, node)| {
                let rel = &k[prefix.len()..];
                let level = rel.split('/').count();
                (depth == 0 || level <= depth).then(|| {
                    let mut entry = DirEntry::new(base(k), node.mode());
                    entry.path = Some(rel.to_string());
                    Ok(entry)
                })
            })
            .collect();
        Ok(ReadDirIter::from_vec(entries))
    }
}

impl FsMkdir for MemFs {
    fn mkdir(&self, ctx: &Context, name: &str) -> Result<(), FsError> {
        self.gate(Cap::Mkdir, "mkdir", name)?;
        let mut tree = self.tree.write().unwrap();
        let key = key(name);
        if tree.contains_key(&key) {
            return Err(FsError::AlreadyExists {
                operation: "mkdir",
                path: name.to_string(),
            });
        }
        Self::check_parent(&tree, "mkdir", name, &key)?;
        tree.insert(
            key,
            Node::Dir {
                mode: ctx.dir_mode().perm(),
            },
        );
        Ok(())
    }
}

impl FsMkdirAll for MemFs {
    fn mkdir_all(&self, ctx: &Context, name: &str) -> Result<(), FsError> {
        self.gate(Cap::MkdirAll, "mkdir_all", name)?;
        let mut tree = self.tree.write().unwrap();
        let key = key(name);
        let mut current = String::new();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            match tree.get(&current) {
                Some(Node::Dir { .. }) => {}
                Some(_) => {
                    return Err(FsError::NotADirectory {
                        operation: "mkdir_all",
                        path: name.to_string(),
                    });
                }
                None => {
                    tree.insert(
                        current.clone(),
                        Node::Dir {
                            mode: ctx.dir_mode().perm(),
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

impl FsSymlink for MemFs {
    fn symlink(&self, _: &Context, target: &str, link: &str) -> Result<(), FsError> {
        self.gate(Cap::Symlink, "symlink", link)?;
        let mut tree = self.tree.write().unwrap();
        let key = key(link);
        if tree.contains_key(&key) {
            return Err(FsError::AlreadyExists {
                operation: "symlink",
                path: link.to_string(),
            });
        }
        Self::check_parent(&tree, "symlink", link, &key)?;
        tree.insert(
            key,
            Node::Symlink {
                target: target.to_string(),
            },
        );
        Ok(())
    }
}

impl FsReadlink for MemFs {
    fn readlink(&self, _: &Context, name: &str) -> Result<String, FsError> {
        self.gate(Cap::Readlink, "readlink", name)?;
        match self.tree.read().unwrap().get(&key(name)) {
            Some(Node::Symlink { target }) => Ok(target.clone()),
            Some(_) => Err(FsError::invalid("readlink", name, "not a symlink")),
            None => Err(FsError::not_found("readlink", name)),
        }
    }
}

impl FsChmod for MemFs {
    fn chmod(&self, _: &Context, name: &str, new_mode: FileMode) -> Result<(), FsError> {
        self.gate(Cap::Chmod, "chmod", name)?;
        match self.tree.write().unwrap().get_mut(&key(name)) {
            Some(Node::File { mode, .. } | Node::Dir { mode }) => {
                *mode = new_mode.perm();
                Ok(())
            }
            Some(Node::Symlink { .. }) => Ok(()),
            None => Err(FsError::not_found("chmod", name)),
        }
    }
}

impl FsAbs for MemFs {
    fn abs(&self, _: &Context, name: &str) -> Result<String, FsError> {
        self.gate(Cap::Abs, "abs", name)?;
        Ok(format!("/{}", key(name)))
    }
}

impl FsLocalize for MemFs {
    fn localize(&self, _: &Context, name: &str) -> Result<String, FsError> {
        self.gate(Cap::Localize, "localize", name)?;
        Ok(name.replace('/', "\\"))
    }
}
