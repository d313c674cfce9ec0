//! Regex grammar for page markup.
//!
//! Every production is anchored with `\A` and applied to the text starting at the
//! cursor, so a match can never silently skip input. [`lex`] tries the productions in
//! a fixed order (comment and directive before the generic code forms, closing tags
//! before opening tags) and falls back to plain text when nothing matches.

use once_cell::sync::Lazy;
use regex::Regex;
use source_location::Span;

use crate::syntax::{Attribute, AttributeValue};

/// Characters allowed in tag names, including namespace prefixes.
const TAG_NAME: &str = r"[\w:.\-]+";

/// Characters allowed in attribute names.
const ATTRIBUTE_NAME: &str = r#"[^\s"'<>/=%]+"#;

/// Attribute values. Data-binding values are tried first so that quotes inside the
/// expression do not terminate the value.
const ATTRIBUTE_VALUE: &str =
    r#""<%#.*?%>"|'<%#.*?%>'|<%#.*?%>|"[^"]*"|'[^']*'|[^\s"'=<>`]+"#;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%--.*?--%>").unwrap());

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%@(.*?)%>").unwrap());

static DATA_BINDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%#(:)?(.*?)%>").unwrap());

static CODE_EXPRESSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%=(.*?)%>").unwrap());

static CODE_ENCODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%:(.*?)%>").unwrap());

static CODE_RENDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\A<%(.*?)%>").unwrap());

static CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\A</({TAG_NAME})\s*>")).unwrap());

static CLOSE_TAG_WITH_RUNAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)\A</({TAG_NAME})[^<>]*?\brunat\s*=\s*["']?server["']?[^<>]*>"#
    ))
    .unwrap()
});

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A<({TAG_NAME})((?:\s+{ATTRIBUTE_NAME}(?:\s*=\s*(?:{ATTRIBUTE_VALUE}))?)*)\s*(/)?>"
    ))
    .unwrap()
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s)\A(\s+)({ATTRIBUTE_NAME})(?:\s*=\s*({ATTRIBUTE_VALUE}))?"
    ))
    .unwrap()
});

static DATA_BINDING_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)\A["']?<%#(:)?(.*?)%>["']?\z"#).unwrap());

static DIRECTIVE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A(\s*)([\w.]+)(?:\s+|\z)").unwrap());

static SERVER_TAG_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A<([\w.\-]+:[\w.\-]+)").unwrap());

/// A plain tag start whose remaining tag text still asks for `runat="server"`.
static RUNAT_TAG_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?i)\A<({TAG_NAME})[^<>]*?\brunat\s*=\s*["']?server\b"#
    ))
    .unwrap()
});

/// A construct recognized at the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// `<%-- ... --%>`
    Comment,
    /// `<%@ ... %>`
    Directive(DirectiveToken<'src>),
    /// `<% ... %>`
    CodeRender {
        /// The code between the delimiters.
        code: &'src str,
    },
    /// `<%= ... %>`
    CodeRenderExpression {
        /// The expression between the delimiters.
        code: &'src str,
    },
    /// `<%: ... %>`
    CodeRenderEncode {
        /// The expression between the delimiters.
        code: &'src str,
    },
    /// `<%# ... %>` or `<%#: ... %>`
    DataBinding {
        /// The binding expression.
        expression: &'src str,
        /// Whether the output is HTML-encoded (`<%#:`).
        encode: bool,
    },
    /// `<name ...>` or `<name ... />`
    OpenTag(TagToken<'src>),
    /// `</name>`
    CloseTag {
        /// The tag name as written.
        name: &'src str,
    },
    /// A run of plain text.
    Text,
    /// A construct that starts like markup but cannot be completed.
    Malformed(Malformed<'src>),
}

/// A recognized construct and the source it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'src> {
    /// What was recognized.
    pub token: Token<'src>,
    /// The consumed source range.
    pub span: Span,
}

/// The pieces of a directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveToken<'src> {
    /// The text between `<%@` and `%>`.
    pub body: &'src str,
    /// Absolute offset of `body`.
    pub body_offset: usize,
}

/// The pieces of an opening or self-closing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken<'src> {
    /// The tag name as written, including any prefix.
    pub name: &'src str,
    /// The attribute text following the name.
    pub attributes: &'src str,
    /// Absolute offset of `attributes`.
    pub attributes_offset: usize,
    /// Whether the tag ends with `/>`.
    pub self_closing: bool,
}

/// Markup that could not be recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed<'src> {
    /// `<%--` without `--%>`. The span covers the rest of the input.
    UnterminatedComment,
    /// `<%@` without `%>`. The span extends to the next `<%@` or the end of input.
    UnterminatedDirective,
    /// `<%` without `%>`. The span covers the rest of the input.
    UnterminatedCode,
    /// `<prefix:name`, or a plain tag carrying `runat="server"`, that does not
    /// complete a tag. The span covers `<` and the name.
    ServerTag {
        /// The tag name as written.
        name: &'src str,
    },
    /// A closing tag carrying `runat="server"`. The span covers the whole tag.
    RunatOnClosingTag {
        /// The tag name as written.
        name: &'src str,
    },
}

/// Recognizes the construct starting exactly at `offset`.
///
/// Always consumes at least one byte when `offset` is inside `source`.
pub fn lex(source: &str, offset: usize) -> Lexeme<'_> {
    let rest = &source[offset..];
    let at = |len: usize| Span::from_offsets(offset, offset + len);

    if rest.starts_with("<%") {
        return lex_server_block(source, offset);
    }

    if rest.starts_with("</") {
        if let Some(caps) = CLOSE_TAG.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            return Lexeme {
                token: Token::CloseTag { name },
                span: at(caps[0].len()),
            };
        }
        if let Some(caps) = CLOSE_TAG_WITH_RUNAT.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            return Lexeme {
                token: Token::Malformed(Malformed::RunatOnClosingTag { name }),
                span: at(caps[0].len()),
            };
        }
    } else if rest.starts_with('<') {
        if let Some(caps) = OPEN_TAG.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let attributes = caps.get(2).map_or((0, ""), |m| (m.start(), m.as_str()));
            return Lexeme {
                token: Token::OpenTag(TagToken {
                    name,
                    attributes: attributes.1,
                    attributes_offset: offset + attributes.0,
                    self_closing: caps.get(3).is_some(),
                }),
                span: at(caps[0].len()),
            };
        }
        if let Some(caps) = SERVER_TAG_START.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            return Lexeme {
                token: Token::Malformed(Malformed::ServerTag { name }),
                span: at(caps[0].len()),
            };
        }
        if let Some(caps) = RUNAT_TAG_START.captures(rest) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            return Lexeme {
                token: Token::Malformed(Malformed::ServerTag { name }),
                span: at(name.len() + 1),
            };
        }
    }

    Lexeme {
        token: Token::Text,
        span: at(text_run_len(rest)),
    }
}

fn lex_server_block(source: &str, offset: usize) -> Lexeme<'_> {
    let rest = &source[offset..];
    let at = |len: usize| Span::from_offsets(offset, offset + len);
    let to_end = Span::from_offsets(offset, source.len());

    if rest.starts_with("<%--") {
        return match COMMENT.find(rest) {
            Some(m) => Lexeme {
                token: Token::Comment,
                span: at(m.end()),
            },
            None => Lexeme {
                token: Token::Malformed(Malformed::UnterminatedComment),
                span: to_end,
            },
        };
    }

    if rest.starts_with("<%@") {
        // A directive cannot contain another directive; treat that as unterminated.
        let resume = rest[3..].find("<%@").map_or(rest.len(), |i| i + 3);
        if let Some(caps) = DIRECTIVE.captures(rest) {
            let body = caps.get(1).map_or((3, ""), |m| (m.start(), m.as_str()));
            if !body.1.contains("<%@") {
                return Lexeme {
                    token: Token::Directive(DirectiveToken {
                        body: body.1,
                        body_offset: offset + body.0,
                    }),
                    span: at(caps[0].len()),
                };
            }
        }
        return Lexeme {
            token: Token::Malformed(Malformed::UnterminatedDirective),
            span: at(resume),
        };
    }

    if let Some(caps) = DATA_BINDING.captures(rest) {
        return Lexeme {
            token: Token::DataBinding {
                expression: capture(&caps, 2),
                encode: caps.get(1).is_some(),
            },
            span: at(caps[0].len()),
        };
    }
    if let Some(caps) = CODE_EXPRESSION.captures(rest) {
        return Lexeme {
            token: Token::CodeRenderExpression {
                code: capture(&caps, 1),
            },
            span: at(caps[0].len()),
        };
    }
    if let Some(caps) = CODE_ENCODE.captures(rest) {
        return Lexeme {
            token: Token::CodeRenderEncode {
                code: capture(&caps, 1),
            },
            span: at(caps[0].len()),
        };
    }
    if let Some(caps) = CODE_RENDER.captures(rest) {
        return Lexeme {
            token: Token::CodeRender {
                code: capture(&caps, 1),
            },
            span: at(caps[0].len()),
        };
    }

    Lexeme {
        token: Token::Malformed(Malformed::UnterminatedCode),
        span: to_end,
    }
}

fn capture<'src>(caps: &regex::Captures<'src>, group: usize) -> &'src str {
    caps.get(group).map_or("", |m| m.as_str())
}

/// Length of the text run at the start of `rest`: everything up to the next `<`,
/// always including the first character.
fn text_run_len(rest: &str) -> usize {
    let first = rest.chars().next().map_or(0, char::len_utf8);
    rest[first..].find('<').map_or(rest.len(), |i| i + first)
}

/// Returns the offset of a `%>` in plain text, which has no matching opener.
pub fn find_stray_server_tag_end(text: &str) -> Option<usize> {
    text.find("%>")
}

/// Returns where raw text content of a `<script>`/`<style>` element ends: at the
/// element's closing tag, at a `<%` construct when `allow_code` is set, or at the
/// end of input.
pub fn raw_text_end(source: &str, offset: usize, tag_name: &str, allow_code: bool) -> usize {
    let rest = &source[offset..];
    let mut search = 0;
    while let Some(found) = rest[search..].find('<') {
        let at = search + found;
        let candidate = &rest[at..];
        if allow_code && candidate.starts_with("<%") {
            return offset + at;
        }
        if let Some(caps) = CLOSE_TAG.captures(candidate) {
            if caps[1].eq_ignore_ascii_case(tag_name) {
                return offset + at;
            }
        }
        search = at + 1;
    }
    source.len()
}

/// Parses the attribute text captured by an opening tag.
///
/// `offset` is the absolute offset of `text` in the page.
pub fn parse_attributes(text: &str, offset: usize) -> Vec<Attribute> {
    let mut attributes = Vec::new();
    let mut cursor = 0;

    while let Some(caps) = ATTRIBUTE.captures(&text[cursor..]) {
        let whole = caps.get(0).map_or(0, |m| m.len());
        if whole == 0 {
            break;
        }
        let leading = caps.get(1).map_or(0, |m| m.len());
        let name = caps.get(2).map_or("", |m| m.as_str());
        let value = caps.get(3).map(|m| m.as_str());
        let start = offset + cursor + leading;

        attributes.push(Attribute {
            name: name.into(),
            value: value.map_or(AttributeValue::Empty, attribute_value),
            span: Span::from_offsets(start, offset + cursor + whole),
        });
        cursor += whole;
    }

    attributes
}

/// The parsed form of a directive body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveBody<'src> {
    /// The leading directive name, when present.
    pub name: Option<&'src str>,
    /// The attributes, in source order.
    pub attributes: Vec<Attribute>,
    /// Text that could not be read as attributes.
    pub leftover: Option<Span>,
}

/// Splits a directive body into its name and attributes.
pub fn parse_directive_body(body: &str, offset: usize) -> DirectiveBody<'_> {
    let mut cursor = 0;
    let mut name = None;

    if let Some(caps) = DIRECTIVE_NAME.captures(body) {
        let word_end = caps.get(2).map_or(0, |m| m.end());
        if !body[word_end..].trim_start().starts_with('=') {
            name = caps.get(2).map(|m| m.as_str());
            cursor = word_end;
        }
    }

    // The attribute production expects leading whitespace before each attribute.
    let mut attributes = Vec::new();
    loop {
        let rest = &body[cursor..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let skipped = rest.len() - trimmed.len();
        let probe_start = cursor + skipped;
        let padded = format!(" {trimmed}");
        let Some(caps) = ATTRIBUTE.captures(&padded) else {
            break;
        };
        let consumed = caps.get(0).map_or(0, |m| m.len()).saturating_sub(1);
        if consumed == 0 {
            break;
        }
        let attr_name = caps.get(2).map_or("", |m| m.as_str());
        let value = caps.get(3).map(|m| m.as_str());
        attributes.push(Attribute {
            name: attr_name.into(),
            value: value.map_or(AttributeValue::Empty, attribute_value),
            span: Span::from_offsets(offset + probe_start, offset + probe_start + consumed),
        });
        cursor = probe_start + consumed;
    }

    let rest = &body[cursor..];
    let leftover = if rest.trim().is_empty() {
        None
    } else {
        let skipped = rest.len() - rest.trim_start().len();
        Some(Span::from_offsets(
            offset + cursor + skipped,
            offset + cursor + rest.trim_end().len(),
        ))
    };

    DirectiveBody {
        name,
        attributes,
        leftover,
    }
}

fn attribute_value(raw: &str) -> AttributeValue {
    if let Some(caps) = DATA_BINDING_VALUE.captures(raw) {
        return AttributeValue::DataBinding {
            expression: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            encode: caps.get(1).is_some(),
        };
    }
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| raw.strip_prefix(*q).and_then(|s| s.strip_suffix(*q)))
        .unwrap_or(raw);
    AttributeValue::Text(unquoted.to_string())
}
