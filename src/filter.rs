/*!
 * Include/exclude filtering of collected files
 */

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::glob::{compile_all, matches_any, GlobMatcher};
use crate::ignore_rules::{has_excluded_extension, IgnoreRuleSet};
use crate::types::FileEntry;

/// Which pattern list is the primary name test
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, ValueEnum, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Allow only names matching the include list
    Include,
    /// Drop names matching the exclude list
    #[default]
    Exclude,
}

/// Immutable snapshot of the filter settings for one copy
#[derive(Debug, Clone, Default)]
pub struct FilterConfiguration {
    /// Primary test selector
    pub mode: FilterMode,
    /// Name patterns for INCLUDE mode
    pub include_patterns: Vec<String>,
    /// Name patterns dropped in both modes
    pub exclude_patterns: Vec<String>,
    /// Lowercase extensions without the leading dot
    pub extra_excluded_extensions: Vec<String>,
    /// Rules from the project's ignore file
    pub ignore_rules: IgnoreRuleSet,
}

/// Compiled form of a [`FilterConfiguration`]
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    mode: FilterMode,
    include: Vec<GlobMatcher>,
    exclude: Vec<GlobMatcher>,
    extra_extensions: Vec<String>,
    ignore_rules: IgnoreRuleSet,
}

impl FilterPolicy {
    /// Compile the patterns of `config`
    pub fn new(config: &FilterConfiguration) -> Self {
        Self {
            mode: config.mode,
            include: compile_all(&config.include_patterns),
            exclude: compile_all(&config.exclude_patterns),
            extra_extensions: config.extra_excluded_extensions.clone(),
            ignore_rules: config.ignore_rules.clone(),
        }
    }

    /// Active mode
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Name-based test selected by the mode.
    ///
    /// In INCLUDE mode an empty include list lets every name through; the
    /// exclude list narrows the result in both modes.
    pub fn passes_primary(&self, name: &str) -> bool {
        let excluded = matches_any(name, &self.exclude);
        match self.mode {
            FilterMode::Include => {
                let included = self.include.is_empty() || matches_any(name, &self.include);
                included && !excluded
            }
            FilterMode::Exclude => !excluded,
        }
    }

    /// Extension and ignore-file layers, applied regardless of mode
    pub fn hits_extra_layers(&self, name: &str, full_path: &str) -> bool {
        has_excluded_extension(name, &self.extra_extensions) || self.ignore_rules.matches(full_path)
    }

    /// Whether a single file survives filtering
    pub fn accepts<E: FileEntry>(&self, file: &E) -> bool {
        if !file.is_valid() || file.is_directory() {
            return false;
        }
        let name = file.name();
        let full_path = file.path().to_string_lossy().replace('\\', "/");

        self.passes_primary(name) && !self.hits_extra_layers(name, &full_path)
    }

    /// Keep the accepted files, preserving order
    pub fn filter<E: FileEntry>(&self, files: &[E]) -> Vec<E> {
        let kept: Vec<E> = files.iter().filter(|f| self.accepts(*f)).cloned().collect();
        tracing::debug!(
            "{} filtering kept {} of {} files",
            self.mode,
            kept.len(),
            files.len()
        );
        kept
    }
}

/// Filter `files` with a freshly compiled policy
pub fn filter<E: FileEntry>(files: &[E], config: &FilterConfiguration) -> Vec<E> {
    FilterPolicy::new(config).filter(files)
}
