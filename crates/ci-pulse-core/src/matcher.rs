//! Repository allow-list matching

use crate::config::ConfigError;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Compiled allow-list for one server
///
/// Patterns use shell glob semantics against the full `namespace/name`:
/// `*` and `?` never cross a `/`, `[...]` is a character class, and a pattern
/// without wildcards only matches itself. An empty list matches nothing.
///
/// The `**` and `{a,b}` extensions of the underlying glob dialect are not
/// plain shell globs and are rejected; `\{` still matches a literal brace.
#[derive(Debug, Clone)]
pub struct RepoMatcher {
    set: Option<GlobSet>,
}

impl RepoMatcher {
    /// Compile a list of patterns
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first pattern that fails to compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        if patterns.is_empty() {
            return Ok(Self { set: None });
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if let Some(construct) = unsupported_construct(pattern) {
                return Err(ConfigError::Invalid {
                    message: format!("Invalid glob pattern '{pattern}': {construct} is not supported"),
                });
            }
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|e| ConfigError::Invalid {
                    message: format!("Invalid glob pattern '{pattern}': {e}"),
                })?;
            builder.add(glob);
        }

        let set = builder.build().map_err(|e| ConfigError::Invalid {
            message: format!("Failed to build glob set: {e}"),
        })?;

        Ok(Self { set: Some(set) })
    }

    /// Whether `full_name` is in scope
    pub fn is_in_scope(&self, full_name: &str) -> bool {
        self.set
            .as_ref()
            .is_some_and(|set| set.is_match(full_name))
    }
}

/// First glob extension in `pattern` that plain shell matching lacks
fn unsupported_construct(pattern: &str) -> Option<&'static str> {
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' if chars.peek() == Some(&'*') => return Some("'**'"),
            '{' | '}' => return Some("brace alternation"),
            _ => {}
        }
    }
    None
}
