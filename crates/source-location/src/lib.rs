//! Source position tracking for the aspx compiler.
//!
//! Raw syntax nodes carry byte [`Span`]s into the page text. The symbol tree carries
//! [`Location`]s instead: a file path plus 1-based line / 0-based column
//! [`Position`]s, produced from spans through a [`LineIndex`].

mod line_index;
mod location;
mod span;

pub use line_index::LineIndex;
pub use location::{Location, LocationError, Position};
pub use span::{ByteOffset, Span};
