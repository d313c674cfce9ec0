//! Parse error types.

use source_location::Span;
use thiserror::Error;

/// An error that occurred while building the raw tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A server tag was never closed.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A closing tag for a server element that is not open.
    #[error("unexpected closing tag: </{tag_name}>")]
    UnexpectedClosingTag {
        /// The name in the closing tag.
        tag_name: String,
    },

    /// A closing tag carrying `runat="server"`.
    #[error("runat is not allowed on a closing tag: </{tag_name}>")]
    RunatOnClosingTag {
        /// The name in the closing tag.
        tag_name: String,
    },

    /// A server tag that starts but cannot be completed.
    #[error("malformed server tag: <{tag_name}")]
    MalformedServerTag {
        /// The prefixed tag name.
        tag_name: String,
    },

    /// A server tag attribute holding a code block other than a data binding.
    #[error("server tag attribute cannot contain a code block: {name}")]
    CodeInServerTag {
        /// The attribute name.
        name: String,
    },

    /// A duplicate attribute was found.
    #[error("duplicate attribute: {name}")]
    DuplicateAttribute {
        /// The name of the duplicated attribute.
        name: String,
    },

    /// Directive text that is not an attribute.
    #[error("malformed directive attribute syntax: {text}")]
    MalformedDirective {
        /// The unreadable text.
        text: String,
    },

    /// A directive in a place directives are not allowed.
    #[error("invalid directive: {message}")]
    InvalidDirective {
        /// A description of the problem.
        message: String,
    },

    /// `<%@` without `%>`.
    #[error("unterminated directive")]
    UnterminatedDirective,

    /// `<%--` without `--%>`.
    #[error("unterminated comment")]
    UnterminatedComment,

    /// `<%` without `%>`.
    #[error("unterminated code block")]
    UnterminatedCodeBlock,

    /// `%>` in plain text.
    #[error("unexpected '%>'")]
    UnexpectedServerTagEnd,
}
