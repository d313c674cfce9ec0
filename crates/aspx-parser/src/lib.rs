//! Markup parser for ASP.NET Web Forms pages.
//!
//! This crate turns `.aspx`/`.ascx`/`.master` text into a raw node tree:
//! - A regex grammar, anchored at the cursor, that recognizes comments,
//!   directives, inline code, data bindings and tags
//! - A tree builder with an explicit open-element stack
//! - Error recovery, so a parse always yields a tree
//!
//! # Example
//!
//! ```
//! use aspx_parser::{parse, Node};
//!
//! let source = r#"<%@ Page Language="C#" %>
//! <asp:Label ID="Greeting" runat="server" Text="Hello" />"#;
//!
//! let result = parse(source);
//! assert!(result.errors.is_empty());
//! assert!(matches!(result.root.children[0], Node::Directive(_)));
//! ```

mod error;
pub mod grammar;
mod parser;
mod syntax;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;
pub use source_location::Span;
pub use syntax::*;

/// Names of the directives that describe the page itself, in priority order.
pub const MAIN_DIRECTIVES: &[&str] = &["Page", "Control", "Master"];

/// The result of parsing a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// The raw tree. Always present, even when errors were found.
    pub root: Root,
    /// Any errors encountered during parsing.
    pub errors: Vec<ParseError>,
}

/// Parses page markup into a raw tree.
///
/// Malformed markup never aborts the parse: the problems are collected in
/// [`ParseResult::errors`] next to a best-effort tree.
pub fn parse(source: &str) -> ParseResult {
    let result = Parser::new(source).parse();
    tracing::trace!(
        nodes = result.root.children.len(),
        errors = result.errors.len(),
        "built raw tree"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let result = parse("");
        assert!(result.errors.is_empty());
        assert_eq!(result.root.span, Span::from_offsets(0, 0));
    }

    #[test]
    fn test_parse_simple_element() {
        let result = parse("<div>hello</div>");
        assert!(result.errors.is_empty());
        assert_eq!(result.root.children.len(), 1);
    }

    #[test]
    fn test_parse_never_panics_on_fragments() {
        for source in ["<", "<%", "</", "<asp:", "%>", "<%@", "<%--", "<a href='", "</a"] {
            let result = parse(source);
            assert_eq!(result.root.span.end_index(), source.len());
        }
    }
}
