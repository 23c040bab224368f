/*!
 * ASCII tree of the selection within the project
 */

use std::collections::HashSet;

use crate::error::Result;
use crate::progress::ProgressSink;
use crate::types::{sort_entries, FileEntry};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Renders the project tree pruned to the selection.
///
/// A node is shown when it is selected, is an ancestor of a selected node, or
/// lies anywhere below a selected directory.
pub struct TreeRenderer<'a, E: FileEntry, P: ProgressSink> {
    root: &'a E,
    progress: &'a P,
    selected: HashSet<String>,
    ancestors: HashSet<String>,
}

impl<'a, E: FileEntry, P: ProgressSink> TreeRenderer<'a, E, P> {
    /// Prepare a renderer for `selection` under `root`.
    ///
    /// Entries outside of `root` are dropped silently.
    pub fn new(selection: &[E], root: &'a E, progress: &'a P) -> Self {
        let selected: HashSet<String> = selection
            .iter()
            .filter_map(|entry| entry.relative_path(root))
            .collect();
        let ancestors = ancestor_paths(&selected);

        Self {
            root,
            progress,
            selected,
            ancestors,
        }
    }

    /// Render the tree, starting with a `.` line for the root
    pub fn render(&self) -> Result<String> {
        let mut output = String::from(".\n");
        let root_selected = self.selected.contains("");
        self.render_directory(self.root, "", root_selected, &mut output)?;
        Ok(output)
    }

    fn render_directory(
        &self,
        dir: &E,
        indent: &str,
        covered: bool,
        output: &mut String,
    ) -> Result<()> {
        self.progress.check_cancelled()?;

        let mut children = match dir.children() {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(
                    "Could not read children of {} for tree view: {}",
                    dir.path().display(),
                    e
                );
                Vec::new()
            }
        };
        sort_entries(&mut children);

        let visible: Vec<(E, bool)> = children
            .into_iter()
            .filter_map(|child| {
                let rel = child.relative_path(self.root)?;
                let is_selected = self.selected.contains(&rel);
                let shown = covered || is_selected || self.ancestors.contains(&rel);
                shown.then_some((child, covered || is_selected))
            })
            .collect();

        let count = visible.len();
        for (index, (child, child_covered)) in visible.into_iter().enumerate() {
            let is_last = index + 1 == count;
            output.push_str(indent);
            output.push_str(if is_last { LAST_BRANCH } else { BRANCH });
            output.push_str(child.name());

            if child.is_directory() {
                output.push_str("/\n");
                let child_indent = format!(
                    "{}{}",
                    indent,
                    if is_last { SPACE_INDENT } else { PIPE_INDENT }
                );
                self.render_directory(&child, &child_indent, child_covered, output)?;
            } else {
                output.push('\n');
            }
        }

        Ok(())
    }
}

/// Every non-empty `/`-prefix of the given relative paths
fn ancestor_paths(paths: &HashSet<String>) -> HashSet<String> {
    let mut ancestors = HashSet::new();
    for path in paths {
        let mut current = path.as_str();
        while let Some((parent, _)) = current.rsplit_once('/') {
            if !parent.is_empty() {
                ancestors.insert(parent.to_string());
            }
            current = parent;
        }
    }
    ancestors
}

/// Render the tree of `selection` under `root`
pub fn render<E: FileEntry, P: ProgressSink>(
    selection: &[E],
    root: &E,
    progress: &P,
) -> Result<String> {
    TreeRenderer::new(selection, root, progress).render()
}
