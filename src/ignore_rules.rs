/*!
 * Ignore-file rules and the extra excluded-extensions layer
 */

use std::fs;
use std::io;
use std::path::Path;

use crate::glob::GlobMatcher;

/// Default name of the ignore file looked up in the project root
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Patterns loaded from a project's ignore file.
///
/// Lines are matched as unanchored, case-sensitive searches against the full
/// path, so `target` also hides `/proj/target/debug/x` and `/proj/targets.md`
/// but leaves `/proj/Target.java` alone.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    rules: Vec<GlobMatcher>,
}

impl IgnoreRuleSet {
    /// Parse ignore-file content; `None` yields an empty rule set
    pub fn load(content: Option<&str>) -> Self {
        let rules = content
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(GlobMatcher::compile_unanchored)
                    .collect()
            })
            .unwrap_or_default();

        Self { rules }
    }

    /// Read the ignore file named `file_name` from `root`.
    ///
    /// A missing file is an empty rule set. An unreadable one is logged and
    /// also treated as empty.
    pub fn from_project_root(root: &Path, file_name: &str) -> Self {
        let path = root.join(file_name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let rules = Self::load(Some(&content));
                tracing::debug!("Loaded {} ignore rules from {}", rules.len(), path.display());
                rules
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!("Could not read ignore file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Whether any rule is found inside `full_path`
    pub fn matches(&self, full_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(full_path))
    }

    /// Number of active rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Normalize the legacy comma-separated extension list.
///
/// `"java, .log , TXT,,"` becomes `["java", "log", "txt"]`.
pub fn parse_extension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

/// Whether the lowercased `name` ends with `.ext` for any of `extensions`
pub fn has_excluded_extension(name: &str, extensions: &[String]) -> bool {
    let name = name.to_lowercase();
    extensions
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext)))
}
