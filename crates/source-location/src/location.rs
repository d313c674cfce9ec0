//! File-qualified locations used by the symbol tree.

use smol_str::SmolStr;
use std::fmt;
use thiserror::Error;

/// A line and column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column (byte offset within the line).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A span of positions within one source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// The path the location belongs to. Only used for tagging.
    pub path: SmolStr,
    /// Where the located text starts.
    pub start: Position,
    /// Where the located text ends.
    pub end: Position,
}

/// Failure to combine two locations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The two locations belong to different files.
    #[error("cannot combine locations from different files: `{first}` and `{second}`")]
    PathMismatch {
        /// Path of the receiver.
        first: SmolStr,
        /// Path of the argument.
        second: SmolStr,
    },
}

impl Location {
    /// Creates a new location.
    pub fn new(path: impl Into<SmolStr>, start: Position, end: Position) -> Self {
        Self {
            path: path.into(),
            start,
            end,
        }
    }

    /// Returns a location spanning from this location's start to `other`'s end.
    ///
    /// Both locations must come from the same path.
    pub fn combine(&self, other: &Location) -> Result<Location, LocationError> {
        if self.path != other.path {
            return Err(LocationError::PathMismatch {
                first: self.path.clone(),
                second: other.path.clone(),
            });
        }
        Ok(Location {
            path: self.path.clone(),
            start: self.start,
            end: other.end,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{})",
            self.path,
            self.start.line,
            self.start.column + 1
        )
    }
}
