/*!
 * Line-comment tokens for file headers
 *
 * Each content block starts with a `File:` line written as a comment of the
 * file's own language, so the pasted context reads naturally to a model.
 */

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;

use crate::error::Result;

/// Token used when a language has no line comment or is unknown
pub const DEFAULT_COMMENT: &str = "#";

/// Lookup from a file to the line-comment token of its language
pub trait CommentLookup {
    /// The token for `path`, `None` when the language is unknown
    fn comment_token(&self, path: &Path) -> Result<Option<String>>;
}

/// Resolve the token for `path`, falling back to [`DEFAULT_COMMENT`].
///
/// Lookup errors are logged and never propagate.
pub fn comment_prefix_for<C: CommentLookup + ?Sized>(lookup: &C, path: &Path) -> String {
    match lookup.comment_token(path) {
        Ok(Some(token)) if !token.trim().is_empty() => token,
        Ok(_) => DEFAULT_COMMENT.to_string(),
        Err(e) => {
            tracing::warn!(
                "Could not determine comment token for {}: {}",
                path.display(),
                e
            );
            DEFAULT_COMMENT.to_string()
        }
    }
}

/// Extension (lowercase) to line-comment token
static BY_EXTENSION: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let groups: &[(&str, &[&str])] = &[
        (
            "//",
            &[
                "rs", "c", "h", "cc", "cpp", "cxx", "hpp", "hxx", "cs", "java", "kt", "kts",
                "scala", "groovy", "gradle", "go", "js", "mjs", "cjs", "jsx", "ts", "tsx",
                "swift", "dart", "php", "zig", "v", "proto", "fs", "fsx", "sol", "scss",
                "less", "gd", "vala", "jsonc",
            ],
        ),
        (
            "#",
            &[
                "py", "pyi", "rb", "sh", "bash", "zsh", "fish", "pl", "pm", "r", "yaml", "yml",
                "toml", "cfg", "conf", "properties", "cmake", "nix", "ex", "exs", "jl", "ps1",
                "tf", "mk", "dockerfile", "gitignore", "env", "cr", "nim", "gn", "bzl",
            ],
        ),
        ("--", &["sql", "lua", "hs", "elm", "ada", "adb", "ads", "vhd", "purs"]),
        (";", &["lisp", "clj", "cljs", "cljc", "el", "scm", "rkt", "asm", "ini"]),
        ("%", &["tex", "sty", "cls", "erl", "hrl", "m"]),
        ("'", &["vb", "vbs", "bas"]),
        ("\"", &["vim"]),
        ("!", &["f90", "f95", "f03"]),
        ("REM", &["bat", "cmd"]),
    ];

    groups
        .iter()
        .flat_map(|(token, exts)| exts.iter().map(move |ext| (*ext, *token)))
        .collect()
});

/// Whole file names without a telling extension
static BY_FILE_NAME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("makefile", "#"),
        ("gnumakefile", "#"),
        ("dockerfile", "#"),
        ("containerfile", "#"),
        ("rakefile", "#"),
        ("gemfile", "#"),
        ("procfile", "#"),
        ("justfile", "#"),
        ("jenkinsfile", "//"),
        ("build", "#"),
        ("workspace", "#"),
    ]
    .into_iter()
    .collect()
});

/// Built-in table keyed by file name and extension
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageComments;

impl CommentLookup for LanguageComments {
    fn comment_token(&self, path: &Path) -> Result<Option<String>> {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        let name = name.to_lowercase();

        if let Some(token) = BY_FILE_NAME.get(name.as_str()) {
            return Ok(Some(token.to_string()));
        }

        let token = Path::new(&name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| BY_EXTENSION.get(ext))
            .map(|token| token.to_string());

        Ok(token)
    }
}
