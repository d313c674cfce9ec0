//! Tree builder: assembles grammar lexemes into a raw node tree.
//!
//! Open elements live on an explicit stack of frames. The builder never aborts:
//! malformed input is recorded in the error list and the parse carries on with a
//! best-effort tree.

use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{self, DirectiveToken, Lexeme, Malformed, TagToken, Token};
use crate::syntax::*;
use crate::{ParseResult, MAIN_DIRECTIVES};
use smol_str::SmolStr;
use source_location::Span;

/// HTML void elements that never have closing tags.
/// See: https://developer.mozilla.org/en-US/docs/Glossary/Void_element
const HTML_VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose content is raw text rather than markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Returns true if the given element name is an HTML void element.
fn is_void_element(name: &str) -> bool {
    HTML_VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

/// An open element and the children collected for it so far.
struct Frame {
    tag: Tag,
}

/// The tree builder.
pub struct Parser<'src> {
    /// The source being parsed.
    source: &'src str,
    /// Current byte offset.
    pos: usize,
    /// Open elements, innermost last.
    stack: Vec<Frame>,
    /// Children of the root.
    root: Vec<Node>,
    /// Parse errors collected during parsing.
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Creates a new parser.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            stack: Vec::new(),
            root: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Parses the source into a raw tree.
    pub fn parse(mut self) -> ParseResult {
        while self.pos < self.source.len() {
            if self.parse_raw_text() {
                continue;
            }
            let lexeme = grammar::lex(self.source, self.pos);
            self.pos = lexeme.span.end_index();
            self.handle(lexeme);
        }
        self.close_remaining_frames();

        ParseResult {
            root: Root {
                children: self.root,
                span: Span::from_offsets(0, self.source.len()),
            },
            errors: self.errors,
        }
    }

    /// Reports an error.
    fn error(&mut self, kind: ParseErrorKind, span: Span) {
        tracing::trace!(%kind, start = u32::from(span.start), "recovering from parse error");
        self.errors.push(ParseError::new(kind, span));
    }

    /// Appends a node to the innermost open element, or the root.
    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.tag.children.push(node),
            None => self.root.push(node),
        }
    }

    fn push_literal(&mut self, span: Span) {
        if span.is_empty() {
            return;
        }
        self.push_node(Node::Literal(Literal {
            text: span.text(self.source).to_string(),
            span,
        }));
    }

    /// Consumes raw text inside `<script>`/`<style>`. Returns true if anything was
    /// consumed.
    fn parse_raw_text(&mut self) -> bool {
        let Some(frame) = self.stack.last() else {
            return false;
        };
        let tag = &frame.tag;
        if tag.prefix.is_some()
            || !RAW_TEXT_ELEMENTS
                .iter()
                .any(|name| tag.local_name.eq_ignore_ascii_case(name))
        {
            return false;
        }

        let allow_code = !tag.runat_server;
        let end = grammar::raw_text_end(self.source, self.pos, &tag.name, allow_code);
        if end == self.pos {
            return false;
        }
        let span = Span::from_offsets(self.pos, end);
        self.pos = end;
        self.push_literal(span);
        true
    }

    fn handle(&mut self, lexeme: Lexeme<'src>) {
        let span = lexeme.span;
        match lexeme.token {
            Token::Comment => {}
            Token::Directive(directive) => self.directive(directive, span),
            Token::CodeRender { code } => self.push_node(Node::CodeRender(CodeBlock {
                code: code.to_string(),
                span,
            })),
            Token::CodeRenderExpression { code } => {
                self.push_node(Node::CodeRenderExpression(CodeBlock {
                    code: code.to_string(),
                    span,
                }))
            }
            Token::CodeRenderEncode { code } => self.push_node(Node::CodeRenderEncode(CodeBlock {
                code: code.to_string(),
                span,
            })),
            Token::DataBinding { expression, encode } => {
                self.push_node(Node::DataBinding(DataBinding {
                    expression: expression.to_string(),
                    encode,
                    span,
                }))
            }
            Token::OpenTag(tag) => self.open_tag(tag, span),
            Token::CloseTag { name } => self.close_tag(name, span),
            Token::Text => self.text(span),
            Token::Malformed(malformed) => self.malformed(malformed, span),
        }
    }

    fn text(&mut self, span: Span) {
        if let Some(at) = grammar::find_stray_server_tag_end(span.text(self.source)) {
            let start = span.start_index() + at;
            self.error(
                ParseErrorKind::UnexpectedServerTagEnd,
                Span::from_offsets(start, start + 2),
            );
        }
        self.push_literal(span);
    }

    fn malformed(&mut self, malformed: Malformed<'src>, span: Span) {
        match malformed {
            Malformed::UnterminatedComment => {
                self.error(ParseErrorKind::UnterminatedComment, span);
            }
            Malformed::UnterminatedDirective => {
                self.error(ParseErrorKind::UnterminatedDirective, span);
            }
            Malformed::UnterminatedCode => {
                self.error(ParseErrorKind::UnterminatedCodeBlock, span);
                self.push_literal(span);
            }
            Malformed::ServerTag { name } => {
                self.error(
                    ParseErrorKind::MalformedServerTag {
                        tag_name: name.to_string(),
                    },
                    span,
                );
                self.push_literal(span);
            }
            Malformed::RunatOnClosingTag { name } => {
                self.error(
                    ParseErrorKind::RunatOnClosingTag {
                        tag_name: name.to_string(),
                    },
                    span,
                );
                self.close_tag(name, span);
            }
        }
    }

    fn directive(&mut self, token: DirectiveToken<'src>, span: Span) {
        let body = grammar::parse_directive_body(token.body, token.body_offset);
        let name = SmolStr::new(body.name.unwrap_or(MAIN_DIRECTIVES[0]));

        if let Some(leftover) = body.leftover {
            self.error(
                ParseErrorKind::MalformedDirective {
                    text: leftover.text(self.source).to_string(),
                },
                leftover,
            );
        }
        if let Some(frame) = self.stack.last() {
            let message = format!(
                "<%@ {} %> must appear at the top level, not inside <{}>",
                name, frame.tag.name
            );
            self.error(ParseErrorKind::InvalidDirective { message }, span);
        }

        let attributes = self.dedup_attributes(body.attributes);
        self.push_node(Node::Directive(Directive {
            name,
            attributes,
            span,
        }));
    }

    /// Drops repeated attributes, keeping the first and reporting the rest.
    fn dedup_attributes(&mut self, attributes: Vec<Attribute>) -> Vec<Attribute> {
        let mut kept: Vec<Attribute> = Vec::with_capacity(attributes.len());
        for attribute in attributes {
            if kept
                .iter()
                .any(|a| a.name.eq_ignore_ascii_case(&attribute.name))
            {
                self.error(
                    ParseErrorKind::DuplicateAttribute {
                        name: attribute.name.to_string(),
                    },
                    attribute.span,
                );
            } else {
                kept.push(attribute);
            }
        }
        kept
    }

    fn open_tag(&mut self, token: TagToken<'src>, span: Span) {
        let (prefix, local_name) = match token.name.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => {
                (Some(SmolStr::new(prefix)), SmolStr::new(local))
            }
            _ => (None, SmolStr::new(token.name)),
        };
        let attributes = grammar::parse_attributes(token.attributes, token.attributes_offset);
        let runat_server = attributes.iter().any(|a| {
            a.name.eq_ignore_ascii_case("runat") && a.value.as_text().eq_ignore_ascii_case("server")
        });

        // Plain markup keeps its inline code: lex the tag text up to the first `<%` as
        // text and resume at the code construct.
        if prefix.is_none() && !runat_server {
            if let Some(at) = span.text(self.source).find("<%") {
                let literal = Span::from_offsets(span.start_index(), span.start_index() + at);
                self.pos = literal.end_index();
                self.push_literal(literal);
                return;
            }
        }

        let attributes = self.dedup_attributes(attributes);
        for attribute in &attributes {
            if matches!(&attribute.value, AttributeValue::Text(text) if has_code_block(text)) {
                self.error(
                    ParseErrorKind::CodeInServerTag {
                        name: attribute.name.to_string(),
                    },
                    attribute.span,
                );
            }
        }
        let self_closing = token.self_closing || (prefix.is_none() && is_void_element(&local_name));
        let tag = Tag {
            name: SmolStr::new(token.name),
            prefix,
            local_name,
            attributes,
            children: Vec::new(),
            span,
            closing: if self_closing {
                Closing::SelfClosing
            } else {
                Closing::Unclosed
            },
            runat_server,
        };

        if self_closing {
            self.push_node(tag_node(tag));
        } else {
            self.stack.push(Frame { tag });
        }
    }

    fn close_tag(&mut self, name: &str, span: Span) {
        let open = self
            .stack
            .iter()
            .rposition(|frame| frame.tag.name.eq_ignore_ascii_case(name));

        let Some(index) = open else {
            if name.contains(':') {
                self.error(
                    ParseErrorKind::UnexpectedClosingTag {
                        tag_name: name.to_string(),
                    },
                    span,
                );
            } else {
                tracing::trace!(name, "keeping stray closing tag as text");
                self.push_literal(span);
            }
            return;
        };

        while self.stack.len() > index + 1 {
            self.close_implicitly(Closing::Unclosed);
        }
        if let Some(mut frame) = self.stack.pop() {
            frame.tag.closing = Closing::Closed(span);
            self.push_node(tag_node(frame.tag));
        }
    }

    /// Closes the innermost frame without a closing tag.
    fn close_implicitly(&mut self, closing: Closing) {
        let Some(mut frame) = self.stack.pop() else {
            return;
        };
        frame.tag.closing = closing;
        if frame.tag.is_server() {
            self.error(
                ParseErrorKind::UnclosedTag {
                    tag_name: frame.tag.name.to_string(),
                },
                frame.tag.span,
            );
        }
        self.push_node(tag_node(frame.tag));
    }

    fn close_remaining_frames(&mut self) {
        while !self.stack.is_empty() {
            self.close_implicitly(Closing::EndOfInput);
        }
    }
}

/// Whether an attribute value holds a code block. `<%$ ... %>` expression values are
/// resolved by the page and stay allowed.
fn has_code_block(value: &str) -> bool {
    value.contains("<%") && !value.trim_start().starts_with("<%$")
}

fn tag_node(tag: Tag) -> Node {
    if tag.prefix.is_some() {
        Node::AspxTag(tag)
    } else {
        Node::HtmlTag(tag)
    }
}
