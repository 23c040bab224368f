/*!
 * Shell-glob to regular expression translation
 *
 * Two dialects share one translator:
 *
 * - name patterns from the include/exclude settings lists, which accept the
 *   extension shorthand (`cs`, `.kt`) and match a whole file name;
 * - ignore-file lines, which are used as written and match anywhere inside a
 *   full path.
 *
 * Name patterns ignore case; ignore-file lines are case-sensitive.
 */

use regex::{Regex, RegexBuilder};

/// Characters escaped verbatim by the translator
const ESCAPED: &[char] = &['.', '+', '(', ')', '|', '^', '$', '@', '%', '\\'];

/// A compiled name or path pattern
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    /// Pattern as supplied by the user
    source: String,
    /// `None` for the empty pattern, which never matches
    regex: Option<Regex>,
}

impl GlobMatcher {
    /// Compile a settings-list pattern anchored to the whole file name.
    ///
    /// Text without `*` or `?` is read as an extension shorthand:
    /// `cs` becomes `*.cs` and `.kt` becomes `*.kt`.
    pub fn compile(pattern: &str) -> Self {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Self::never(pattern);
        }

        let expanded = expand_shorthand(pattern);
        let regex = format!("^{}$", translate(&expanded));
        Self::build(pattern, &regex, true)
    }

    /// Compile an ignore-file line for unanchored search within a path
    pub fn compile_unanchored(pattern: &str) -> Self {
        if pattern.is_empty() {
            return Self::never(pattern);
        }
        Self::build(pattern, &translate(pattern), false)
    }

    /// Whether the pattern matches `candidate`
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex
            .as_ref()
            .map_or(false, |regex| regex.is_match(candidate))
    }

    /// The pattern this matcher was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    fn never(source: &str) -> Self {
        Self {
            source: source.to_string(),
            regex: None,
        }
    }

    fn build(source: &str, regex: &str, ignore_case: bool) -> Self {
        // Every metacharacter the translator emits is escaped or a `.`/`.*`,
        // so a build failure can only mean the size limit was hit.
        let regex = match RegexBuilder::new(regex)
            .case_insensitive(ignore_case)
            .build() {
            Ok(regex) => Some(regex),
            Err(e) => {
                tracing::warn!("Pattern {:?} could not be compiled: {}", source, e);
                None
            }
        };

        Self {
            source: source.to_string(),
            regex,
        }
    }
}

/// Compile a list of settings patterns, skipping blank entries
pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Vec<GlobMatcher> {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !p.trim().is_empty())
        .map(GlobMatcher::compile)
        .collect()
}

/// Whether any matcher accepts `name`
pub fn matches_any(name: &str, matchers: &[GlobMatcher]) -> bool {
    matchers.iter().any(|m| m.is_match(name))
}

fn is_globby(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

fn expand_shorthand(pattern: &str) -> String {
    if is_globby(pattern) {
        pattern.to_string()
    } else if pattern.starts_with('.') {
        format!("*{}", pattern)
    } else {
        format!("*.{}", pattern)
    }
}

/// Translate glob syntax into regex syntax without anchors
fn translate(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c if ESCAPED.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            // Anything else is taken literally; escaping the remaining regex
            // metacharacters keeps the translation total.
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
    }
    out
}
