/*!
 * Core types and data structures for llmcopy
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::utils::is_binary_file;

/// Read-only view of a file or directory supplied by the host.
///
/// Implementations are cheap handles that read through to the underlying
/// storage on every call, so a directory's children are a fresh snapshot each
/// time they are requested.
pub trait FileEntry: Clone {
    /// Absolute path of the entry
    fn path(&self) -> &Path;

    /// Final path component
    fn name(&self) -> &str;

    /// Whether the entry is a directory
    fn is_directory(&self) -> bool;

    /// Direct children of a directory, unsorted
    fn children(&self) -> io::Result<Vec<Self>>;

    /// Size in bytes
    fn byte_length(&self) -> u64;

    /// Whether the content looks binary
    fn is_binary(&self) -> bool;

    /// Load the content as UTF-8 text
    fn read_text(&self) -> io::Result<String>;

    /// Whether the entry still exists and is accessible
    fn is_valid(&self) -> bool;

    /// Path relative to `root`, `/`-separated; `None` outside of `root`.
    ///
    /// The root itself is the empty string.
    fn relative_path(&self, root: &Self) -> Option<String> {
        let rel = self.path().strip_prefix(root.path()).ok()?;
        Some(
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
        )
    }
}

/// Sort entries directories first, then by name
pub fn sort_entries<E: FileEntry>(entries: &mut [E]) {
    entries.sort_by_cached_key(|e| (!e.is_directory(), e.name().to_string()));
}

/// Sort entries in the order the tree under `root` lists them.
///
/// Paths are compared component by component, directories before files at
/// each level, so nested files keep their place below their directories.
pub fn sort_tree_order<E: FileEntry>(entries: &mut [E], root: &E) {
    entries.sort_by_cached_key(|e| tree_order_key(e, root));
}

fn tree_order_key<E: FileEntry>(entry: &E, root: &E) -> Vec<(bool, String)> {
    let path = entry.path();
    let rel = path.strip_prefix(root.path()).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let last = parts.len().saturating_sub(1);

    parts
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let is_dir = index < last || entry.is_directory();
            (!is_dir, name)
        })
        .collect()
}

/// A file or directory on the local filesystem
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsEntry {
    /// Absolute path
    path: PathBuf,
    /// File name, or the full path for roots without one
    name: String,
}

impl FsEntry {
    /// Open an existing path, resolving it to an absolute canonical path
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = fs::canonicalize(path.as_ref())?;
        Ok(Self::from_canonical(path))
    }

    fn from_canonical(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }
}

impl FileEntry for FsEntry {
    fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    // Symlinks are never descended into
    fn is_directory(&self) -> bool {
        fs::symlink_metadata(&self.path)
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    fn children(&self) -> io::Result<Vec<Self>> {
        WalkDir::new(&self.path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .map(|entry| {
                entry
                    .map(|e| Self::from_canonical(e.into_path()))
                    .map_err(io::Error::from)
            })
            .collect()
    }

    fn byte_length(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn is_binary(&self) -> bool {
        match is_binary_file(&self.path) {
            Ok(binary) => binary,
            Err(e) => {
                tracing::debug!("Could not sniff {}: {}", self.path.display(), e);
                false
            }
        }
    }

    fn read_text(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn is_valid(&self) -> bool {
        fs::symlink_metadata(&self.path).is_ok()
    }
}

/// How a build finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Tree and contents were produced
    Complete,
    /// The selection was empty; nothing was traversed
    NothingSelected,
    /// No project root could be resolved
    NoProjectRoot,
}

/// Output of one content build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    /// Final text placed on the clipboard
    pub content: String,
    /// Files whose content was emitted
    pub file_count: usize,
    /// Files annotated as empty, binary or unreadable
    pub skipped_count: usize,
    /// How the build finished
    pub status: BuildStatus,
}

impl BuildResult {
    /// Result for an empty selection
    pub fn nothing_selected() -> Self {
        Self {
            content: "No files selected.".to_string(),
            file_count: 0,
            skipped_count: 0,
            status: BuildStatus::NothingSelected,
        }
    }

    /// Result when the project root is unknown
    pub fn no_project_root() -> Self {
        Self {
            content: "Error: Could not determine project base directory.".to_string(),
            file_count: 0,
            skipped_count: 0,
            status: BuildStatus::NoProjectRoot,
        }
    }

    /// Number of characters in the content
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Number of lines in the content
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}
