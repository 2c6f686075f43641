// Directory tree walking
//
// Builds an ordered FileNode tree from a WalkDir pre-order traversal.
// Children are sorted by file name so repeated runs produce identical output.

use crate::config::ScanConfig;
use crate::error::{Error, Result};
use glob::Pattern;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Classification of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    Markdown,
    Other,
}

/// A file or directory in the scanned tree
#[derive(Debug, Clone, Serialize)]
pub struct FileNode {
    pub name: String,
    pub path: PathBuf,
    /// Path relative to the scanned root, `/`-separated (empty for the root)
    pub relative_path: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub children: Vec<FileNode>,
}

impl FileNode {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// All markdown files below this node, in tree order
    pub fn markdown_files(&self) -> Vec<&FileNode> {
        let mut out = Vec::new();
        self.collect_markdown(&mut out);
        out
    }

    fn collect_markdown<'a>(&'a self, out: &mut Vec<&'a FileNode>) {
        for child in &self.children {
            if child.kind == NodeKind::Markdown {
                out.push(child);
            }
            child.collect_markdown(out);
        }
    }

    /// Markdown files directly inside this directory
    pub fn markdown_count(&self) -> usize {
        self.children
            .iter()
            .filter(|c| c.kind == NodeKind::Markdown)
            .count()
    }

    /// Number of nodes below this one
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| 1 + c.descendant_count())
            .sum()
    }

    /// Look up a descendant by its root-relative path
    pub fn find(&self, relative_path: &str) -> Option<&FileNode> {
        if self.relative_path == relative_path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(relative_path))
    }
}

/// Why part of the tree could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeWarningKind {
    PermissionDenied,
    FilesystemLoop,
    Io,
}

/// A non-fatal problem met while walking
#[derive(Debug, Clone, Serialize)]
pub struct TreeWarning {
    pub path: PathBuf,
    pub kind: TreeWarningKind,
    pub message: String,
}

impl TreeWarning {
    fn from_walk_error(err: &walkdir::Error, root: &Path) -> Self {
        let path = err.path().unwrap_or(root).to_path_buf();
        let kind = if err.loop_ancestor().is_some() {
            TreeWarningKind::FilesystemLoop
        } else if err
            .io_error()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::PermissionDenied)
        {
            TreeWarningKind::PermissionDenied
        } else {
            TreeWarningKind::Io
        };

        Self {
            path,
            kind,
            message: err.to_string(),
        }
    }
}

/// Output of a walk: the tree plus anything that was skipped
#[derive(Debug, Clone)]
pub struct WalkOutcome {
    pub root: FileNode,
    pub warnings: Vec<TreeWarning>,
}

/// Enumerates a folder into a FileNode tree
#[derive(Debug, Clone)]
pub struct TreeWalker {
    recursive: bool,
    include_hidden: bool,
    ignore: Vec<Pattern>,
    extensions: Vec<String>,
}

impl TreeWalker {
    /// Create a walker from scan settings
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        let ignore = config
            .ignore
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            recursive: config.recursive,
            include_hidden: config.include_hidden,
            ignore,
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
        })
    }

    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Walk `root` and build its tree.
    ///
    /// Unreadable subdirectories are reported as warnings and kept as
    /// childless nodes; the walk continues over their siblings.
    pub fn walk(&self, root: &Path) -> Result<WalkOutcome> {
        check_root(root)?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut stack: Vec<FileNode> = Vec::new();
        let mut warnings = Vec::new();

        let entries = WalkDir::new(root)
            .follow_links(true)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_ignored(e, root));

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let warning = TreeWarning::from_walk_error(&err, root);
                    warn!(path = %warning.path.display(), kind = ?warning.kind, "skipping unreadable entry");
                    warnings.push(warning);
                    continue;
                }
            };

            let depth = entry.depth();
            if depth == 0 {
                stack.push(FileNode {
                    name: root_name(root),
                    path: root.to_path_buf(),
                    relative_path: String::new(),
                    kind: NodeKind::Directory,
                    depth: 0,
                    children: Vec::new(),
                });
                continue;
            }

            close_until(&mut stack, depth);
            let node = self.node_for(&entry, root);
            debug!(path = %node.relative_path, kind = ?node.kind, "discovered entry");

            if node.is_dir() {
                stack.push(node);
            } else if let Some(parent) = stack.last_mut() {
                parent.children.push(node);
            }
        }

        close_until(&mut stack, 1);
        let root = stack
            .pop()
            .ok_or_else(|| Error::other(format!("Cannot read folder: {}", root.display())))?;

        Ok(WalkOutcome { root, warnings })
    }

    /// Count markdown files directly inside `dir`, honoring the ignore policy
    pub fn count_markdown(&self, dir: &Path) -> usize {
        WalkDir::new(dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_entry(|e| !self.is_ignored(e, dir))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_markdown(e.path()))
            .count()
    }

    /// Hidden entries and ignore-pattern matches are skipped
    fn is_ignored(&self, entry: &DirEntry, root: &Path) -> bool {
        let name = entry.file_name().to_string_lossy();
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }

        let relative = relative_path(entry.path(), root);
        self.ignore
            .iter()
            .any(|p| p.matches(&name) || p.matches(&relative))
    }

    fn is_markdown(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|m| m.eq_ignore_ascii_case(ext)))
    }

    fn node_for(&self, entry: &DirEntry, root: &Path) -> FileNode {
        let file_type = entry.file_type();
        let kind = if file_type.is_dir() {
            NodeKind::Directory
        } else if file_type.is_file() && self.is_markdown(entry.path()) {
            NodeKind::Markdown
        } else {
            NodeKind::Other
        };

        FileNode {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path().to_path_buf(),
            relative_path: relative_path(entry.path(), root),
            kind,
            depth: entry.depth(),
            children: Vec::new(),
        }
    }
}

/// Fail unless `root` is an existing directory
pub fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(Error::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// Pop open directories deeper than `depth` into their parents
fn close_until(stack: &mut Vec<FileNode>, depth: usize) {
    while stack.len() > depth {
        let Some(node) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => {
                stack.push(node);
                break;
            }
        }
    }
}

fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| root.display().to_string())
}
