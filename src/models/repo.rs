use crate::errors::BrowseError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

lazy_static! {
    static ref REPO_ID_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._-]+/[A-Za-z0-9._-]+$"
    ).unwrap();
}

/// A validated `owner/name` GitHub repository identifier.
///
/// Immutable once accepted; an invalid input never reaches the fetch layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepoId(String);

impl RepoId {
    /// Trims whitespace and accepts only `owner/name` where both segments
    /// are non-empty runs of ASCII letters, digits, `.`, `_` or `-`.
    pub fn parse(raw: &str) -> Result<Self, BrowseError> {
        let trimmed = raw.trim();
        if REPO_ID_REGEX.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(BrowseError::Validation(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn owner(&self) -> &str {
        self.split().0
    }

    pub fn name(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        match self.0.split_once('/') {
            Some(pair) => pair,
            // unreachable for a parsed identifier
            None => (self.0.as_str(), ""),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
