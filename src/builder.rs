/*!
 * Content building: tree plus per-file blocks
 */

use std::io;

use crate::collector::should_descend_into;
use crate::comment::{comment_prefix_for, CommentLookup, LanguageComments};
use crate::error::Result;
use crate::filter::FilterPolicy;
use crate::progress::ProgressSink;
use crate::tree::TreeRenderer;
use crate::types::{sort_entries, sort_tree_order, BuildResult, BuildStatus, FileEntry};

static DEFAULT_COMMENTS: LanguageComments = LanguageComments;

/// Share of the progress bar spent before file contents are processed
const CONTENT_PHASE_START: f64 = 0.2;

/// Separator between the tree and the file contents
const SEPARATOR: &str = "---";

#[derive(Debug, Default)]
struct Tally {
    files: usize,
    skipped: usize,
}

/// Why a file's content is not emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    Empty,
    Binary,
}

impl SkipReason {
    fn of<E: FileEntry>(file: &E) -> Option<Self> {
        if file.byte_length() == 0 {
            Some(Self::Empty)
        } else if file.is_binary() {
            Some(Self::Binary)
        } else {
            None
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Binary => "binary",
        }
    }
}

/// Builds the pasteable text for a selection.
///
/// The output is a header naming the project, the pruned directory tree, a
/// `---` separator and one block per file:
///
/// ```text
/// // File: src/lib.rs
///
/// <content>
/// ```
///
/// Empty and binary files get a one-line annotation instead of content; read
/// failures are annotated inline and the walk carries on.
pub struct ContentBuilder<'a, E: FileEntry, P: ProgressSink> {
    root: Option<&'a E>,
    progress: &'a P,
    comments: &'a dyn CommentLookup,
    filter: Option<&'a FilterPolicy>,
    project_name: Option<String>,
    total_files: usize,
    processed_files: usize,
}

impl<'a, E: FileEntry, P: ProgressSink> ContentBuilder<'a, E, P> {
    /// Create a builder for the project at `root`
    pub fn new(root: Option<&'a E>, progress: &'a P) -> Self {
        Self {
            root,
            progress,
            comments: &DEFAULT_COMMENTS,
            filter: None,
            project_name: None,
            total_files: 0,
            processed_files: 0,
        }
    }

    /// Use a different language comment lookup
    pub fn with_comments(mut self, comments: &'a dyn CommentLookup) -> Self {
        self.comments = comments;
        self
    }

    /// Filter files found inside selected directories while building.
    ///
    /// Heavy directories are pruned as during collection. Without a filter
    /// the selection is taken as already filtered.
    ///
    /// The tree is still rendered from the unfiltered selection, so it can
    /// list files and heavy directories whose content is left out.
    pub fn with_filter(mut self, filter: &'a FilterPolicy) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Name shown in the header; defaults to the root directory name
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Build the text for `selection`.
    ///
    /// Only cancellation is returned as an error; every other problem is
    /// logged and folded into the result.
    pub fn build(&mut self, selection: &[E]) -> Result<BuildResult> {
        if selection.is_empty() {
            return Ok(BuildResult::nothing_selected());
        }

        self.progress.report(0.0, "Determining project structure...");
        let Some(root) = self.root else {
            tracing::warn!("Could not determine project base directory.");
            return Ok(BuildResult::no_project_root());
        };
        tracing::info!("Using project base directory for paths: {}", root.path().display());

        let mut sorted = selection.to_vec();
        sort_tree_order(&mut sorted, root);

        self.progress.report(0.1, "Calculating total files...");
        self.total_files = self.estimate_total_files(&sorted)?;
        tracing::info!("Estimated total files to process: {}", self.total_files);

        self.progress.report(0.1, "Building tree structure...");
        let tree = TreeRenderer::new(&sorted, root, self.progress).render()?;

        self.progress.report(CONTENT_PHASE_START, "Processing file contents...");
        self.processed_files = 0;
        let mut contents = String::new();
        let mut tally = Tally::default();
        for entry in &sorted {
            self.process_entry(entry, root, &mut contents, &mut tally)?;
        }

        self.progress.report(1.0, "Finalizing...");
        let project_name = self
            .project_name
            .clone()
            .unwrap_or_else(|| root.name().to_string());
        let content = format!(
            "Selected structure within project '{}':\n{}\n\n{}\n\n{}",
            project_name,
            tree.trim_end(),
            SEPARATOR,
            contents
        );

        Ok(BuildResult {
            content: content.trim().to_string(),
            file_count: tally.files,
            skipped_count: tally.skipped,
            status: BuildStatus::Complete,
        })
    }

    fn estimate_total_files(&self, entries: &[E]) -> Result<usize> {
        let mut count = 0;
        for entry in entries {
            self.progress.check_cancelled()?;
            if entry.is_directory() {
                match entry.children() {
                    Ok(children) => {
                        let children: Vec<E> = children
                            .into_iter()
                            .filter(|c| self.should_walk(c))
                            .collect();
                        count += self.estimate_total_files(&children)?;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Could not estimate children for {}: {}",
                            entry.path().display(),
                            e
                        );
                    }
                }
            } else if self.admits(entry) {
                count += 1;
            }
        }
        Ok(count)
    }

    fn process_entry(
        &mut self,
        entry: &E,
        root: &E,
        output: &mut String,
        tally: &mut Tally,
    ) -> Result<()> {
        self.progress.check_cancelled()?;

        if entry.is_directory() {
            let mut children = match entry.children() {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!(
                        "Could not process children of {} for content: {}",
                        entry.path().display(),
                        e
                    );
                    return Ok(());
                }
            };
            children.retain(|c| self.should_walk(c));
            sort_entries(&mut children);
            for child in &children {
                self.process_entry(child, root, output, tally)?;
            }
            Ok(())
        } else if self.admits(entry) {
            self.handle_file(entry, root, output, tally)
        } else {
            tracing::debug!("Filtered out {}", entry.path().display());
            Ok(())
        }
    }

    fn handle_file(&mut self, file: &E, root: &E, output: &mut String, tally: &mut Tally) -> Result<()> {
        self.update_progress(&format!("Processing: {}", file.name()))?;

        let path_from_root = file
            .relative_path(root)
            .filter(|rel| !rel.is_empty())
            .unwrap_or_else(|| file.name().to_string());
        let prefix = comment_prefix_for(self.comments, file.path());

        output.push_str(&format!("\n{} File: {}\n", prefix, path_from_root));

        if let Some(reason) = SkipReason::of(file) {
            output.push_str(&format!("{} ({} file, content skipped)\n", prefix, reason.label()));
            output.push_str("\n\n");
            tally.skipped += 1;
            return Ok(());
        }

        match file.read_text() {
            Ok(content) => {
                output.push('\n');
                output.push_str(&content);
                output.push_str("\n\n\n");
                tally.files += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!("Error processing file content: {}: {}", file.path().display(), e);
                output.push_str(&format!("\n{} Error processing file: {}\n\n\n", prefix, e));
                tally.skipped += 1;
            }
            Err(e) => {
                tracing::warn!("Could not read file content: {}: {}", file.path().display(), e);
                output.push_str(&format!("\n{} Error reading file: {}\n\n\n", prefix, e));
                tally.skipped += 1;
            }
        }

        Ok(())
    }

    fn update_progress(&mut self, details: &str) -> Result<()> {
        self.processed_files += 1;
        self.progress.check_cancelled()?;

        let fraction = if self.total_files > 0 {
            let done = self.processed_files as f64 / self.total_files as f64;
            (CONTENT_PHASE_START + done * (1.0 - CONTENT_PHASE_START)).min(1.0)
        } else {
            CONTENT_PHASE_START
        };
        self.progress.report(fraction, details);
        Ok(())
    }

    /// Whether a child found during the walk is visited at all
    fn should_walk(&self, child: &E) -> bool {
        match self.filter {
            Some(_) if child.is_directory() => should_descend_into(child),
            _ => true,
        }
    }

    /// Whether a file passes the deferred filter, if any
    fn admits(&self, file: &E) -> bool {
        self.filter.map_or(true, |filter| filter.accepts(file))
    }
}
