/*!
 * One copy request from selection to clipboard
 *
 * Resolution, collection and filtering run on the calling thread. The content
 * build runs on a dedicated worker thread; its result is handed back and
 * placed on the clipboard by the caller, so nothing is written when the build
 * fails or is cancelled.
 */

use std::any::Any;
use std::path::PathBuf;
use std::thread;

use crate::builder::ContentBuilder;
use crate::clipboard::Clipboard;
use crate::collector::{collect, resolve_selection};
use crate::error;
use crate::error::CopyError;
use crate::filter::{FilterConfiguration, FilterMode, FilterPolicy};
use crate::progress::ProgressSink;
use crate::types::{BuildResult, BuildStatus, FsEntry};

const WORKER_NAME: &str = "llmcopy-build";

/// Everything a copy needs from the host
#[derive(Debug, Clone, Default)]
pub struct CopyRequest {
    /// Selected files and directories, in selection order
    pub selection: Vec<PathBuf>,
    /// Files open in the editor, used when the selection is empty
    pub open_files: Vec<PathBuf>,
    /// Project root
    pub root: Option<PathBuf>,
    /// Filter snapshot for this copy
    pub filter: FilterConfiguration,
    /// Header name; defaults to the root directory name
    pub project_name: Option<String>,
}

/// How a copy request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Content was built and is ready to place
    Copied(BuildResult),
    /// No candidate files were found
    NothingFound,
    /// Every candidate was removed by the filter in this mode
    FilteredToEmpty(FilterMode),
    /// A selection was given but none of it could be resolved
    Unresolved,
    /// The project root could not be determined
    NoProjectRoot,
    /// The build was cancelled; nothing is reported
    Cancelled,
    /// The request failed with a cause
    Failed(String),
}

impl Outcome {
    /// User notification, `None` when nothing should be shown
    pub fn message(&self, destination: &str) -> Option<String> {
        let message = match self {
            Self::Copied(result) => format!(
                "Copied {} files ({} skipped, {} characters) to {}.",
                result.file_count,
                result.skipped_count,
                result.char_count(),
                destination
            ),
            Self::NothingFound => {
                "No files found. Select files or directories, or pass --open files.".to_string()
            }
            Self::FilteredToEmpty(mode) => {
                format!("After {} filtering there are no files to copy.", mode)
            }
            Self::Unresolved => "Could not determine the selected files/folders to copy.".to_string(),
            Self::NoProjectRoot => BuildResult::no_project_root().content,
            Self::Cancelled => return None,
            Self::Failed(cause) => format!("Error copying content: {}", cause),
        };
        Some(message)
    }

    /// Process exit code for the outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Copied(_) => 0,
            Self::Failed(_) => 1,
            Self::NothingFound | Self::FilteredToEmpty(_) | Self::Unresolved | Self::NoProjectRoot => 2,
            Self::Cancelled => 130,
        }
    }
}

/// Resolve, collect, filter and build `request`.
///
/// Never panics and never returns an error: every failure is an [`Outcome`].
pub fn run_copy<P>(request: &CopyRequest, progress: P) -> Outcome
where
    P: ProgressSink + Send + 'static,
{
    let root = request.root.as_ref().and_then(|path| match FsEntry::open(path) {
        Ok(root) => Some(root),
        Err(e) => {
            tracing::warn!("Could not open project root {}: {}", path.display(), e);
            None
        }
    });

    let selection = resolve_selection(&request.selection, root.as_ref());
    if !request.selection.is_empty() && selection.is_empty() {
        return Outcome::Unresolved;
    }
    let open_files = resolve_selection(&request.open_files, root.as_ref());

    let candidates = collect(&selection, &open_files, root.as_ref());
    if candidates.is_empty() {
        return Outcome::NothingFound;
    }

    let policy = FilterPolicy::new(&request.filter);
    let files = policy.filter(&candidates);
    if files.is_empty() {
        return Outcome::FilteredToEmpty(policy.mode());
    }
    tracing::info!(
        "Copying {} of {} candidate files",
        files.len(),
        candidates.len()
    );

    build_in_worker(files, root, request.project_name.clone(), progress)
}

/// Run `request` and place the built content on `clipboard`
pub fn copy_to<P, C>(request: &CopyRequest, progress: P, clipboard: &C) -> Outcome
where
    P: ProgressSink + Send + 'static,
    C: Clipboard + ?Sized,
{
    match run_copy(request, progress) {
        Outcome::Copied(result) => match clipboard.set_contents(&result.content) {
            Ok(()) => Outcome::Copied(result),
            Err(e) => {
                let e = CopyError::from(e);
                tracing::error!("{}", e);
                Outcome::Failed(e.to_string())
            }
        },
        other => other,
    }
}

fn build_in_worker<P>(
    files: Vec<FsEntry>,
    root: Option<FsEntry>,
    project_name: Option<String>,
    progress: P,
) -> Outcome
where
    P: ProgressSink + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || {
            let mut builder = ContentBuilder::new(root.as_ref(), &progress);
            if let Some(name) = project_name {
                builder = builder.with_project_name(name);
            }
            builder.build(&files)
        });

    let handle = match spawned {
        Ok(handle) => handle,
        Err(e) => {
            let e = error!(Unexpected, "could not start build worker: {}", e);
            tracing::error!("{}", e);
            return Outcome::Failed(e.to_string());
        }
    };

    match handle.join() {
        Ok(Ok(result)) => match result.status {
            BuildStatus::Complete => Outcome::Copied(result),
            BuildStatus::NoProjectRoot => Outcome::NoProjectRoot,
            BuildStatus::NothingSelected => Outcome::NothingFound,
        },
        Ok(Err(e)) if e.is_cancelled() => {
            tracing::info!("Copy cancelled");
            Outcome::Cancelled
        }
        Ok(Err(e)) => {
            tracing::error!("Content build failed: {:?}", e);
            Outcome::Failed(e.to_string())
        }
        Err(payload) => {
            let e = error!(Unexpected, "build worker panicked: {}", panic_message(&*payload));
            tracing::error!("{}", e);
            Outcome::Failed(e.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown cause".to_string()
    }
}
