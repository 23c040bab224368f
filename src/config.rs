/*!
 * Configuration handling for llmcopy
 */

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

use crate::ensure;
use crate::error::{CopyError, Result};
use crate::filter::{FilterConfiguration, FilterMode};
use crate::ignore_rules::{parse_extension_list, IgnoreRuleSet, DEFAULT_IGNORE_FILE};

const APP_NAME: &str = "llmcopy";
const SETTINGS_FILE: &str = "settings.json";

/// Command-line arguments for llmcopy
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    name = "llmcopy",
    version = env!("CARGO_PKG_VERSION"),
    about = "Copy a file tree and file contents to the clipboard as LLM context",
    long_about = "Builds a pastable text made of the project tree pruned to the selected files and folders, followed by the content of every selected file, and places it on the system clipboard."
)]
pub struct Args {
    /// Files or directories to copy
    pub paths: Vec<PathBuf>,

    /// Project root used for relative paths (default: nearest directory containing .git)
    #[clap(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Comma-separated files used when no paths are given (the open editors)
    #[clap(long, value_delimiter = ',', value_name = "FILES")]
    pub open: Vec<PathBuf>,

    /// Filter mode
    #[clap(long, value_enum)]
    pub mode: Option<FilterMode>,

    /// Comma-separated name patterns allowed in include mode
    #[clap(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Comma-separated name patterns dropped in both modes
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Comma-separated extensions always dropped, e.g. "java, .log"
    #[clap(long = "exclude-ext", value_name = "EXTS")]
    pub exclude_ext: Option<String>,

    /// Do not apply the project's ignore file
    #[clap(long)]
    pub no_ignore_file: bool,

    /// Write the content to stdout instead of the clipboard
    #[clap(long)]
    pub print: bool,

    /// Write the content to a file instead of the clipboard
    #[clap(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Persist the effective filter settings
    #[clap(long)]
    pub save: bool,

    /// Alternate settings file
    #[clap(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[clap(long)]
    pub show_settings: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

impl Args {
    /// Default `tracing` directive for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Settings file this run reads and writes
    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.settings {
            Some(path) => Ok(path.clone()),
            None => Settings::default_path()
                .ok_or_else(|| CopyError::Config("Could not determine config directory".into())),
        }
    }
}

/// Persisted filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Primary filter mode
    pub mode: FilterMode,

    /// Name patterns allowed in include mode
    pub include_patterns: Vec<String>,

    /// Name patterns dropped in both modes
    pub exclude_patterns: Vec<String>,

    /// Comma-separated extensions always dropped
    pub excluded_extensions: String,

    /// Whether the project's ignore file is applied
    pub respect_ignore_file: bool,

    /// Name of the ignore file at the project root
    pub ignore_file_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: FilterMode::Exclude,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            excluded_extensions: String::new(),
            respect_ignore_file: true,
            ignore_file_name: DEFAULT_IGNORE_FILE.to_string(),
        }
    }
}

impl Settings {
    /// `<config dir>/llmcopy/settings.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(SETTINGS_FILE))
    }

    /// Load settings from `path`.
    ///
    /// A missing file yields the defaults. A file that does not parse is
    /// logged and replaced by the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("Settings file not found at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(settings) => {
                tracing::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse settings file at {}: {}. Falling back to defaults.",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Write settings to `path`, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
                tracing::info!("Created settings directory: {}", dir.display());
            }
        }

        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Check the settings for values the pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        let name = self.ignore_file_name.trim();
        ensure!(!name.is_empty(), Config, "ignore file name must not be empty");
        ensure!(
            !name.contains('/') && !name.contains('\\'),
            Config,
            "ignore file name must be a plain file name, got '{}'",
            name
        );
        Ok(())
    }

    /// Override the stored values with the ones given on the command line
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(mode) = args.mode {
            self.mode = mode;
        }
        if !args.include.is_empty() {
            self.include_patterns = clean_patterns(&args.include);
        }
        if !args.exclude.is_empty() {
            self.exclude_patterns = clean_patterns(&args.exclude);
        }
        if let Some(exts) = &args.exclude_ext {
            self.excluded_extensions = exts.clone();
        }
        if args.no_ignore_file {
            self.respect_ignore_file = false;
        }
    }

    /// Normalized extra excluded extensions
    pub fn excluded_extension_list(&self) -> Vec<String> {
        parse_extension_list(&self.excluded_extensions)
    }

    /// Snapshot the settings for one copy rooted at `root`
    pub fn filter_configuration(&self, root: Option<&Path>) -> FilterConfiguration {
        let ignore_rules = match root {
            Some(root) if self.respect_ignore_file => {
                IgnoreRuleSet::from_project_root(root, self.ignore_file_name.trim())
            }
            _ => IgnoreRuleSet::default(),
        };

        FilterConfiguration {
            mode: self.mode,
            include_patterns: self.include_patterns.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            extra_excluded_extensions: self.excluded_extension_list(),
            ignore_rules,
        }
    }
}

fn clean_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Nearest ancestor of `start` containing `.git`, else `start` itself
pub fn discover_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .unwrap_or(start)
        .to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mode, FilterMode::Exclude);
        assert!(settings.respect_ignore_file);
        assert_eq!(settings.ignore_file_name, ".gitignore");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            mode: FilterMode::Include,
            include_patterns: vec!["rs".into()],
            excluded_extensions: "lock".into(),
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"mode\": \"include\""));
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "excluded_extensions": "java, .log , txt" }"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.mode, FilterMode::Exclude);
        assert!(settings.respect_ignore_file);
        assert_eq!(settings.excluded_extension_list(), vec!["java", "log", "txt"]);
    }

    #[test]
    fn test_invalid_ignore_file_name_is_rejected() {
        let settings = Settings {
            ignore_file_name: "sub/.gitignore".into(),
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(CopyError::Config(_))));

        let dir = tempdir().unwrap();
        let blank = Settings {
            ignore_file_name: "  ".into(),
            ..Default::default()
        };
        assert!(blank.save(&dir.path().join("s.json")).is_err());
    }

    #[test]
    fn test_args_override_settings() {
        let args = Args::parse_from([
            "llmcopy",
            "--mode",
            "include",
            "--include",
            "rs, toml",
            "--exclude-ext",
            ".md",
            "--no-ignore-file",
            "src",
        ]);
        let mut settings = Settings {
            exclude_patterns: vec!["log".into()],
            ..Default::default()
        };
        settings.apply_args(&args);

        assert_eq!(settings.mode, FilterMode::Include);
        assert_eq!(settings.include_patterns, vec!["rs", "toml"]);
        assert_eq!(settings.exclude_patterns, vec!["log"]);
        assert_eq!(settings.excluded_extensions, ".md");
        assert!(!settings.respect_ignore_file);
        assert_eq!(args.paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn test_filter_configuration_reads_ignore_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "# comment\n*.tmp\n\n").unwrap();

        let settings = Settings::default();
        let config = settings.filter_configuration(Some(dir.path()));
        assert_eq!(config.ignore_rules.len(), 1);

        let disabled = Settings {
            respect_ignore_file: false,
            ..Default::default()
        };
        assert!(disabled
            .filter_configuration(Some(dir.path()))
            .ignore_rules
            .is_empty());
    }

    #[test]
    fn test_discover_project_root() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_project_root(&nested), nested);

        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(discover_project_root(&nested), dir.path());
    }

    #[test]
    fn test_log_level_follows_verbosity() {
        assert_eq!(Args::parse_from(["llmcopy"]).log_level(), "warn");
        assert_eq!(Args::parse_from(["llmcopy", "-v"]).log_level(), "info");
        assert_eq!(Args::parse_from(["llmcopy", "-vv"]).log_level(), "debug");
    }
}
