//! Test doubles shared by the unit tests

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::progress::ProgressSink;
use crate::types::FileEntry;

static LOGGING_INIT: Once = Once::new();

/// Route `tracing` output to the test harness once per process
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    ReadError(String),
    NotUtf8,
}

#[derive(Debug, Clone)]
enum Kind {
    File {
        content: Content,
        binary: bool,
        len: u64,
    },
    Dir(Vec<MemEntry>),
    UnreadableDir,
}

/// In-memory file tree implementing [`FileEntry`]
#[derive(Debug, Clone)]
pub struct MemEntry {
    name: String,
    path: PathBuf,
    rel: String,
    kind: Kind,
    valid: bool,
}

impl MemEntry {
    fn new(name: &str, kind: Kind) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::from(name),
            rel: name.to_string(),
            kind,
            valid: true,
        }
    }

    /// Text file
    pub fn file(name: &str, content: &str) -> Self {
        Self::new(
            name,
            Kind::File {
                content: Content::Text(content.to_string()),
                binary: false,
                len: content.len() as u64,
            },
        )
    }

    /// Binary file of `len` bytes
    pub fn binary(name: &str, len: u64) -> Self {
        Self::new(
            name,
            Kind::File {
                content: Content::ReadError("binary content".to_string()),
                binary: true,
                len,
            },
        )
    }

    /// Non-empty text file whose read fails with `message`
    pub fn unreadable_file(name: &str, message: &str) -> Self {
        Self::new(
            name,
            Kind::File {
                content: Content::ReadError(message.to_string()),
                binary: false,
                len: 42,
            },
        )
    }

    /// Non-empty file that is not valid UTF-8
    pub fn garbled_file(name: &str) -> Self {
        Self::new(
            name,
            Kind::File {
                content: Content::NotUtf8,
                binary: false,
                len: 7,
            },
        )
    }

    /// Directory
    pub fn dir(name: &str, children: Vec<MemEntry>) -> Self {
        Self::new(name, Kind::Dir(children))
    }

    /// Directory whose listing fails
    pub fn unreadable_dir(name: &str) -> Self {
        Self::new(name, Kind::UnreadableDir)
    }

    /// Mark the entry as no longer existing
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Project root at `/<name>`; assigns paths to the whole tree
    pub fn root(name: &str, children: Vec<MemEntry>) -> Self {
        let mut root = Self::dir(name, children);
        root.place(Path::new("/"), None);
        root
    }

    fn place(&mut self, parent: &Path, parent_rel: Option<&str>) {
        self.path = parent.join(&self.name);
        self.rel = match parent_rel {
            None => String::new(),
            Some("") => self.name.clone(),
            Some(p) => format!("{}/{}", p, self.name),
        };

        let path = self.path.clone();
        let rel = self.rel.clone();
        if let Kind::Dir(children) = &mut self.kind {
            for child in children {
                child.place(&path, Some(&rel));
            }
        }
    }

    /// Descendant at a `/`-separated relative path
    pub fn find(&self, rel: &str) -> MemEntry {
        let mut current = self.clone();
        for part in rel.split('/') {
            let next = match &current.kind {
                Kind::Dir(children) => children.iter().find(|c| c.name == part).cloned(),
                _ => None,
            };
            current = next.unwrap_or_else(|| panic!("no entry {} under {}", rel, self.rel));
        }
        current
    }

    /// Path relative to the root this entry was placed under
    pub fn rel(&self) -> String {
        self.rel.clone()
    }
}

impl FileEntry for MemEntry {
    fn path(&self) -> &Path {
        &self.path
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_directory(&self) -> bool {
        matches!(self.kind, Kind::Dir(_) | Kind::UnreadableDir)
    }

    fn children(&self) -> io::Result<Vec<Self>> {
        match &self.kind {
            Kind::Dir(children) => Ok(children.clone()),
            Kind::UnreadableDir => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            Kind::File { .. } => Ok(Vec::new()),
        }
    }

    fn byte_length(&self) -> u64 {
        match &self.kind {
            Kind::File { len, .. } => *len,
            _ => 0,
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self.kind, Kind::File { binary: true, .. })
    }

    fn read_text(&self) -> io::Result<String> {
        match &self.kind {
            Kind::File {
                content: Content::Text(text),
                ..
            } => Ok(text.clone()),
            Kind::File {
                content: Content::ReadError(message),
                ..
            } => Err(io::Error::new(io::ErrorKind::Other, message.clone())),
            Kind::File {
                content: Content::NotUtf8,
                ..
            } => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "stream did not contain valid UTF-8",
            )),
            _ => Err(io::Error::new(io::ErrorKind::Other, "is a directory")),
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Progress sink that records every report
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub reports: RefCell<Vec<(f64, String)>>,
}

impl ProgressSink for RecordingProgress {
    fn report(&self, fraction: f64, status: &str) {
        self.reports.borrow_mut().push((fraction, status.to_string()));
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Progress sink that reports cancelled after a number of polls
#[derive(Debug)]
pub struct CancelAfter {
    remaining: Cell<usize>,
}

impl CancelAfter {
    pub fn polls(count: usize) -> Self {
        Self {
            remaining: Cell::new(count),
        }
    }
}

impl ProgressSink for CancelAfter {
    fn report(&self, _fraction: f64, _status: &str) {}

    fn is_cancelled(&self) -> bool {
        match self.remaining.get() {
            0 => true,
            n => {
                self.remaining.set(n - 1);
                false
            }
        }
    }
}
