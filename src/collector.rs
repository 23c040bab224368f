/*!
 * Selection resolution and file collection
 */

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::types::{sort_entries, FileEntry, FsEntry};

/// Directory names never descended into while expanding a selection
pub const HEAVY_DIRECTORIES: &[&str] = &[
    ".git",
    ".idea",
    "node_modules",
    "dist",
    "build",
    "out",
    "bin",
    "target",
    ".gradle",
];

/// Something the host can turn into a filesystem entry.
///
/// Resolution is an ordered chain of attempts; the first that yields an
/// existing entry wins.
pub trait Resolvable {
    /// Resolve to an entry, `None` when nothing matches
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry>;
}

impl Resolvable for FsEntry {
    fn resolve(&self, _root: Option<&FsEntry>) -> Option<FsEntry> {
        self.is_valid().then(|| self.clone())
    }
}

impl Resolvable for Path {
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry> {
        // 1. As given: absolute, or relative to the working directory
        if let Ok(entry) = FsEntry::open(self) {
            return Some(entry);
        }

        // 2. Relative to the project root
        if self.is_relative() {
            if let Some(root) = root {
                if let Ok(entry) = FsEntry::open(root.path().join(self)) {
                    return Some(entry);
                }
            }
        }

        tracing::warn!("Could not resolve selection entry: {}", self.display());
        None
    }
}

impl Resolvable for PathBuf {
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry> {
        self.as_path().resolve(root)
    }
}

impl Resolvable for str {
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry> {
        Path::new(self).resolve(root)
    }
}

impl Resolvable for String {
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry> {
        self.as_str().resolve(root)
    }
}

impl<T: Resolvable + ?Sized> Resolvable for &T {
    fn resolve(&self, root: Option<&FsEntry>) -> Option<FsEntry> {
        (**self).resolve(root)
    }
}

/// Resolve raw selection items, dropping unresolvable ones and duplicates
pub fn resolve_selection<I>(items: I, root: Option<&FsEntry>) -> Vec<FsEntry>
where
    I: IntoIterator,
    I::Item: Resolvable,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter_map(|item| item.resolve(root))
        .filter(|entry| seen.insert(entry.path().to_path_buf()))
        .collect()
}

/// Gather candidate files for a copy.
///
/// Uses the selection when it is non-empty, otherwise the files open in the
/// editor, otherwise the whole project root. Directories are expanded
/// recursively; the result holds files only, deduplicated in first-seen order.
pub fn collect<E: FileEntry>(selection: &[E], open_files: &[E], root: Option<&E>) -> Vec<E> {
    if !selection.is_empty() {
        let files = expand(selection);
        tracing::debug!("Collected {} files from the selection", files.len());
        return files;
    }

    if !open_files.is_empty() {
        let files = expand(open_files);
        tracing::debug!("Collected {} files from open editors", files.len());
        return files;
    }

    match root {
        Some(root) if root.is_valid() => {
            let files = expand(std::slice::from_ref(root));
            tracing::debug!("Collected {} files from the project root", files.len());
            files
        }
        _ => Vec::new(),
    }
}

/// Expand directories into their files, skipping heavy folders and invalid entries
pub fn expand<E: FileEntry>(entries: &[E]) -> Vec<E> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for entry in entries {
        if !entry.is_valid() {
            continue;
        }
        if entry.is_directory() {
            expand_directory(entry, &mut seen, &mut out);
        } else if seen.insert(entry.path().to_path_buf()) {
            out.push(entry.clone());
        }
    }

    out
}

/// Whether a subdirectory should be walked during expansion
pub fn should_descend_into<E: FileEntry>(dir: &E) -> bool {
    let name = dir.name().to_lowercase();
    !HEAVY_DIRECTORIES.contains(&name.as_str())
}

fn expand_directory<E: FileEntry>(dir: &E, seen: &mut HashSet<PathBuf>, out: &mut Vec<E>) {
    let mut children = match dir.children() {
        Ok(children) => children,
        Err(e) => {
            tracing::warn!("Could not list {}: {}", dir.path().display(), e);
            return;
        }
    };
    sort_entries(&mut children);

    for child in children {
        if !child.is_valid() {
            continue;
        }
        if child.is_directory() {
            if should_descend_into(&child) {
                expand_directory(&child, seen, out);
            } else {
                tracing::debug!("Skipping heavy directory {}", child.path().display());
            }
        } else if seen.insert(child.path().to_path_buf()) {
            out.push(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemEntry;

    fn names(files: &[MemEntry]) -> Vec<String> {
        files.iter().map(|f| f.rel()).collect()
    }

    fn project() -> MemEntry {
        MemEntry::root(
            "proj",
            vec![
                MemEntry::dir(
                    "src",
                    vec![
                        MemEntry::file("main.rs", "fn main() {}"),
                        MemEntry::dir("util", vec![MemEntry::file("io.rs", "// io")]),
                    ],
                ),
                MemEntry::dir("node_modules", vec![MemEntry::file("left-pad.js", "x")]),
                MemEntry::dir("target", vec![MemEntry::file("app", "bin")]),
                MemEntry::dir(".git", vec![MemEntry::file("HEAD", "ref")]),
                MemEntry::file("README.md", "# readme"),
            ],
        )
    }

    #[test]
    fn test_expand_prunes_heavy_directories() {
        let root = project();
        let files = collect(&[], &[], Some(&root));
        assert_eq!(names(&files), vec!["src/util/io.rs", "src/main.rs", "README.md"]);
    }

    #[test]
    fn test_selection_wins_and_dedupes() {
        let root = project();
        let main = root.find("src/main.rs");
        let src = root.find("src");
        let editor = root.find("README.md");

        let files = collect(&[main.clone(), src, main], &[editor], Some(&root));
        assert_eq!(names(&files), vec!["src/main.rs", "src/util/io.rs"]);
    }

    #[test]
    fn test_open_files_fallback() {
        let root = project();
        let editor = root.find("README.md");
        let files = collect(&[], &[editor], Some(&root));
        assert_eq!(names(&files), vec!["README.md"]);
    }

    #[test]
    fn test_explicitly_selected_heavy_directory_is_expanded() {
        let root = project();
        let files = collect(&[root.find("target")], &[], Some(&root));
        assert_eq!(names(&files), vec!["target/app"]);
    }

    #[test]
    fn test_invalid_and_unreadable_entries_are_skipped() {
        let root = MemEntry::root(
            "proj",
            vec![
                MemEntry::unreadable_dir("locked"),
                MemEntry::file("gone.txt", "x").invalid(),
                MemEntry::file("ok.txt", "x"),
            ],
        );
        let files = collect(&[], &[], Some(&root));
        assert_eq!(names(&files), vec!["ok.txt"]);
    }

    #[test]
    fn test_resolve_selection_against_project_root() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir(dir.path().join("pkg"))?;
        std::fs::write(dir.path().join("pkg/entry.rs"), "fn entry() {}")?;
        std::fs::write(dir.path().join("notes.md"), "# notes")?;
        let root = FsEntry::open(dir.path())?;

        let notes = root.path().join("notes.md");
        let items = vec![
            PathBuf::from("pkg/entry.rs"),
            PathBuf::from("missing.rs"),
            PathBuf::from("pkg/entry.rs"),
            notes.clone(),
        ];
        let resolved = resolve_selection(&items, Some(&root));

        let entry = root.path().join("pkg/entry.rs");
        let paths: Vec<&Path> = resolved.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec![entry.as_path(), notes.as_path()]);

        // Without a root, a relative path only resolves against the working directory
        assert!(Path::new("pkg/entry.rs").resolve(None).is_none());
        Ok(())
    }

    #[test]
    fn test_nothing_to_collect() {
        let files: Vec<MemEntry> = collect(&[], &[], None);
        assert!(files.is_empty());
    }
}
