//! Fuzzy pattern matching used by the Filter stage (`§4.5`).
//!
//! A pattern either contains a `*` wildcard, in which case it is compiled
//! into a case-insensitive regex anchored at both ends with `*` mapped to
//! `.*`, or it does not, in which case a candidate matches when it equals
//! the pattern or contains it as a substring (also case-insensitively).

use regex::Regex;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("invalid wildcard pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

enum Compiled {
    Wildcard(Regex),
    Substring(String),
}

/// A single compiled pattern.
pub struct Pattern {
    raw: String,
    compiled: Compiled,
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern").field("raw", &self.raw).finish()
    }
}

impl Pattern {
    pub fn compile(pattern: &str) -> Result<Self, MatcherError> {
        let compiled = if pattern.contains('*') {
            let escaped = regex::escape(pattern).replace(r"\*", ".*");
            let anchored = format!("(?i)^{escaped}$");
            let re = Regex::new(&anchored).map_err(|source| MatcherError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            Compiled::Wildcard(re)
        } else {
            Compiled::Substring(pattern.to_lowercase())
        };
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        match &self.compiled {
            Compiled::Wildcard(re) => re.is_match(candidate),
            Compiled::Substring(needle) => candidate.to_lowercase().contains(needle.as_str()),
        }
    }
}

/// A set of patterns tested with OR semantics.
#[derive(Debug, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn compile<I, S>(patterns: I) -> Result<Self, MatcherError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Pattern::compile(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True if `candidate` matches at least one pattern in the set.
    #[must_use]
    pub fn matches_any(&self, candidate: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(candidate))
    }
}
