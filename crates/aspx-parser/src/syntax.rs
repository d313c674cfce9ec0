//! Raw syntax tree produced by the tree builder.
//!
//! Raw nodes keep byte spans into the page text. They only live for one parse and are
//! converted into the symbol tree afterwards.

use smol_str::SmolStr;
use source_location::Span;

/// The root of a parsed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Root {
    /// Top-level nodes in source order.
    pub children: Vec<Node>,
    /// The span of the whole input.
    pub span: Span,
}

/// A node in the raw tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A container of nodes.
    Root(Root),
    /// `<%@ Name attr=value %>`
    Directive(Directive),
    /// A tag with a namespace prefix, e.g. `<asp:Label>`.
    AspxTag(Tag),
    /// A tag without a prefix, e.g. `<div>` or `<form runat="server">`.
    HtmlTag(Tag),
    /// Plain text.
    Literal(Literal),
    /// `<% code %>`
    CodeRender(CodeBlock),
    /// `<%= expression %>`
    CodeRenderExpression(CodeBlock),
    /// `<%: expression %>`
    CodeRenderEncode(CodeBlock),
    /// `<%# expression %>`
    DataBinding(DataBinding),
}

impl Node {
    /// Returns the span of this node. For tags this covers the closing tag too.
    pub fn span(&self) -> Span {
        match self {
            Node::Root(n) => n.span,
            Node::Directive(n) => n.span,
            Node::AspxTag(n) | Node::HtmlTag(n) => n.full_span(),
            Node::Literal(n) => n.span,
            Node::CodeRender(n) | Node::CodeRenderExpression(n) | Node::CodeRenderEncode(n) => {
                n.span
            }
            Node::DataBinding(n) => n.span,
        }
    }

    /// Returns the child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root(n) => &n.children,
            Node::AspxTag(n) | Node::HtmlTag(n) => &n.children,
            Node::Directive(_)
            | Node::Literal(_)
            | Node::CodeRender(_)
            | Node::CodeRenderExpression(_)
            | Node::CodeRenderEncode(_)
            | Node::DataBinding(_) => &[],
        }
    }
}

/// A page directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The directive name. `Page` when the directive does not name itself.
    pub name: SmolStr,
    /// The attributes in source order.
    pub attributes: Vec<Attribute>,
    /// The span of the whole directive.
    pub span: Span,
}

impl Directive {
    /// Looks up an attribute by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }
}

/// How a tag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// `<br/>`, or an HTML void element such as `<br>`.
    SelfClosing,
    /// Closed by a matching closing tag with the given span.
    Closed(Span),
    /// Implicitly closed by an outer closing tag.
    Unclosed,
    /// Still open when the input ended.
    EndOfInput,
}

/// An element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// The name as written, including any prefix (`asp:Label`).
    pub name: SmolStr,
    /// The namespace prefix, if any (`asp`).
    pub prefix: Option<SmolStr>,
    /// The name without its prefix (`Label`).
    pub local_name: SmolStr,
    /// The attributes in source order.
    pub attributes: Vec<Attribute>,
    /// The child nodes.
    pub children: Vec<Node>,
    /// The span of the opening (or self-closing) tag.
    pub span: Span,
    /// How the element ends.
    pub closing: Closing,
    /// Whether the tag carries `runat="server"`.
    pub runat_server: bool,
}

impl Tag {
    /// Looks up an attribute by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        find_attribute(&self.attributes, name)
    }

    /// Returns the textual value of an attribute, ignoring ASCII case of the name.
    pub fn attribute_text(&self, name: &str) -> Option<&str> {
        self.attribute(name).map(|a| a.value.as_text())
    }

    /// Whether this tag is processed on the server: it carries a namespace prefix or
    /// `runat="server"`.
    pub fn is_server(&self) -> bool {
        self.prefix.is_some() || self.runat_server
    }

    /// Whether the local name equals `name`, ignoring ASCII case.
    pub fn is_named(&self, name: &str) -> bool {
        self.local_name.eq_ignore_ascii_case(name)
    }

    /// The span from the opening tag to the end of the closing tag, if any.
    pub fn full_span(&self) -> Span {
        match self.closing {
            Closing::Closed(close) => self.span.cover(close),
            Closing::SelfClosing | Closing::Unclosed | Closing::EndOfInput => {
                let end = self.children.last().map_or(self.span.end, |c| c.span().end);
                Span::new(self.span.start, end.max(self.span.end))
            }
        }
    }
}

/// An attribute of a tag or directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The name as written.
    pub name: SmolStr,
    /// The value.
    pub value: AttributeValue,
    /// The span of `name=value`.
    pub span: Span,
}

/// The value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A name without a value (`<input disabled>`).
    Empty,
    /// A literal value, quotes removed.
    Text(String),
    /// A data-binding value (`Text='<%# Eval("Name") %>'`).
    DataBinding {
        /// The binding expression.
        expression: String,
        /// Whether the output is HTML-encoded.
        encode: bool,
    },
}

impl AttributeValue {
    /// The value as plain text. Data-binding values yield their expression.
    pub fn as_text(&self) -> &str {
        match self {
            AttributeValue::Empty => "",
            AttributeValue::Text(text) => text,
            AttributeValue::DataBinding { expression, .. } => expression,
        }
    }
}

/// Plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    /// The text, exactly as in the source.
    pub text: String,
    /// The span of the text.
    pub span: Span,
}

/// An inline code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// The code between the delimiters.
    pub code: String,
    /// The span including the delimiters.
    pub span: Span,
}

/// A data-binding expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBinding {
    /// The expression between the delimiters.
    pub expression: String,
    /// Whether the output is HTML-encoded (`<%#:`).
    pub encode: bool,
    /// The span including the delimiters.
    pub span: Span,
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attributes
        .iter()
        .find(|a| a.name.eq_ignore_ascii_case(name))
}
