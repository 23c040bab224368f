/*!
 * llmcopy - Copy a file tree and file contents as LLM context
 *
 * This library turns a selection of files and folders into one pasteable
 * text: the project tree pruned to the selection, followed by the content of
 * every selected file headed by a comment in the file's own language.
 */

pub mod builder;
pub mod clipboard;
pub mod collector;
pub mod comment;
pub mod config;
pub mod error;
pub mod filter;
pub mod glob;
pub mod ignore_rules;
pub mod progress;
pub mod report;
pub mod session;
pub mod tree;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_support;

// Re-export main components for easier access
pub use builder::ContentBuilder;
pub use config::{Args, Settings};
pub use error::{CopyError, Result};
pub use filter::{FilterConfiguration, FilterMode, FilterPolicy};
pub use progress::{CancelToken, ConsoleProgress, ProgressSink};
pub use report::{CopyReport, ReportFormat, Reporter};
pub use session::{copy_to, run_copy, CopyRequest, Outcome};
pub use types::{BuildResult, BuildStatus, FileEntry, FsEntry};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
