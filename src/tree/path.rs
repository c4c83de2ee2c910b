//! Topic path parsing
//!
//! A topic path is one or more non-empty segments joined by `.`,
//! e.g. `room.42.chat`. The segment `*` is reserved as the wildcard.

use std::fmt;

use super::error::{TreeError, TreeResult};

/// Separator between path segments
pub const DELIMITER: char = '.';

/// Reserved wildcard segment
pub const WILDCARD: &str = "*";

/// A validated topic path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPath<'a> {
    raw: &'a str,
}

impl<'a> TopicPath<'a> {
    /// Validate a raw path string
    ///
    /// Rejects the empty string and any empty segment, so `a..b`,
    /// `.a` and `a.` all fail.
    pub fn parse(raw: &'a str) -> TreeResult<Self> {
        if raw.is_empty() {
            return Err(TreeError::InvalidPath {
                path: raw.to_string(),
                reason: "path is empty",
            });
        }

        if raw.split(DELIMITER).any(str::is_empty) {
            return Err(TreeError::InvalidPath {
                path: raw.to_string(),
                reason: "empty segment",
            });
        }

        Ok(Self { raw })
    }

    /// Iterate over the path segments in order
    pub fn segments(&self) -> impl Iterator<Item = &'a str> {
        self.raw.split(DELIMITER)
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The first segment, used by prefix-based authorization
    pub fn root_segment(&self) -> &'a str {
        self.segments().next().unwrap_or(self.raw)
    }

    pub fn as_str(&self) -> &'a str {
        self.raw
    }
}

impl fmt::Display for TopicPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw)
    }
}
