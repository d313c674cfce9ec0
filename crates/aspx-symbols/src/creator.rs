//! Symbol creation: converts the raw node tree into controls.

use crate::builder::ControlListBuilder;
use crate::control::{
    CodeControl, Control, LiteralControl, Property, RootControl, Script, Template, TextLine,
    TypedAttribute, TypedControl,
};
use crate::control_info::{ControlInfo, ControlLookup, DataType, DataTypeKind, QualifiedName};
use crate::page::{resolve_virtual_path, user_control_type, PageDirective, PageError};
use crate::resolver::{resolve, Resolution, UserControls, CONTENT_PLACEHOLDER_TYPE};
use aspx_parser::{Closing, Directive, Node, Root, Tag};
use camino::{Utf8Path, Utf8PathBuf};
use smol_str::SmolStr;
use source_location::{LineIndex, Location, Span};

/// State collected while visiting one page.
#[derive(Debug, Default)]
pub(crate) struct Session {
    pub errors: Vec<PageError>,
    pub templates: Vec<Template>,
    pub scripts: Vec<Script>,
    pub content_placeholders: Vec<String>,
    pub directives: Vec<PageDirective>,
    pub user_controls: UserControls,
    pub additional_files: Vec<Utf8PathBuf>,
}

/// Converts raw nodes of one page into controls.
///
/// Holds only read-only inputs; everything collected goes into the [`Session`]
/// passed to each call.
pub(crate) struct SymbolCreator<'a, L: ControlLookup + ?Sized> {
    path: &'a Utf8Path,
    path_tag: SmolStr,
    source: &'a str,
    line_index: LineIndex,
    lookup: &'a L,
}

impl<'a, L: ControlLookup + ?Sized> SymbolCreator<'a, L> {
    pub fn new(path: &'a Utf8Path, source: &'a str, lookup: &'a L) -> Self {
        Self {
            path,
            path_tag: SmolStr::new(path.as_str()),
            source,
            line_index: LineIndex::new(source),
            lookup,
        }
    }

    /// Converts a byte span of the page into a location.
    pub fn location(&self, span: Span) -> Location {
        Location::new(
            self.path_tag.clone(),
            self.line_index.position(span.start),
            self.line_index.position(span.end),
        )
    }

    /// Visits the page root, returning its merged top-level controls.
    pub fn root(&self, session: &mut Session, root: &Root) -> RootControl {
        let mut children = ControlListBuilder::new();
        for child in &root.children {
            children.add(self.visit(session, child));
        }
        RootControl {
            children: children.build(),
        }
    }

    /// Converts one raw node into at most one control.
    pub fn visit(&self, session: &mut Session, node: &Node) -> Option<Control> {
        match node {
            Node::Root(root) => Some(Control::Root(self.root(session, root))),
            Node::Directive(directive) => {
                self.directive(session, directive);
                None
            }
            Node::Literal(literal) => Some(self.literal(literal.span)),
            Node::CodeRenderEncode(code) => Some(Control::Code(CodeControl {
                code: code.code.clone(),
                location: self.location(code.span),
            })),
            Node::CodeRender(_) | Node::CodeRenderExpression(_) | Node::DataBinding(_) => {
                self.pass_through(session, node)
            }
            Node::AspxTag(tag) => self.server_tag(session, tag),
            Node::HtmlTag(tag) if tag.runat_server => self.server_tag(session, tag),
            Node::HtmlTag(tag) => Some(self.markup(session, tag)),
        }
    }

    /// Visits the children of a node that has no control of its own.
    fn pass_through(&self, session: &mut Session, node: &Node) -> Option<Control> {
        let mut children = ControlListBuilder::new();
        for child in node.children() {
            children.add(self.visit(session, child));
        }
        if children.is_empty() {
            return None;
        }
        Some(Control::Root(RootControl {
            children: children.build(),
        }))
    }

    fn literal(&self, span: Span) -> Control {
        Control::Literal(LiteralControl {
            text: span.text(self.source).to_string(),
            location: self.location(span),
        })
    }

    /// Plain markup: the tag text itself is literal, the children are visited.
    fn markup(&self, session: &mut Session, tag: &Tag) -> Control {
        let mut children = ControlListBuilder::new();
        children.add(Some(self.literal(tag.span)));
        for child in &tag.children {
            children.add(self.visit(session, child));
        }
        match tag.closing {
            Closing::Closed(close) => children.add(Some(self.literal(close))),
            // No closing tag in the source: frame the element with a zero-width one.
            Closing::EndOfInput => children.add(Some(Control::Literal(LiteralControl {
                text: format!("</{}>", tag.name),
                location: self.location(Span::empty(tag.full_span().end)),
            }))),
            Closing::SelfClosing | Closing::Unclosed => {}
        }
        Control::Root(RootControl {
            children: children.build(),
        })
    }

    fn directive(&self, session: &mut Session, directive: &Directive) {
        let directive = PageDirective {
            name: directive.name.clone(),
            attributes: directive
                .attributes
                .iter()
                .map(|a| (a.name.clone(), a.value.as_text().to_string()))
                .collect(),
            location: self.location(directive.span),
        };
        if directive.is_named("Register") {
            self.register(session, &directive);
        }
        session.directives.push(directive);
    }

    /// `<%@ Register TagPrefix="uc" TagName="Header" Src="~/Header.ascx" %>`
    fn register(&self, session: &mut Session, directive: &PageDirective) {
        let (Some(prefix), Some(name), Some(src)) = (
            directive.attribute("TagPrefix"),
            directive.attribute("TagName"),
            directive.attribute("Src"),
        ) else {
            return;
        };
        let path = resolve_virtual_path(self.path, src);
        tracing::trace!(prefix, name, %path, "registered user control");
        session
            .user_controls
            .register(prefix, name, user_control_type(&path));
        if !session.additional_files.contains(&path) {
            session.additional_files.push(path);
        }
    }

    fn server_tag(&self, session: &mut Session, tag: &Tag) -> Option<Control> {
        match resolve(tag, self.lookup, &session.user_controls) {
            Resolution::Content => {
                self.content(session, tag);
                None
            }
            Resolution::ContentPlaceholder { id } => {
                let info = tag
                    .prefix
                    .as_deref()
                    .and_then(|prefix| self.lookup.try_get_control(prefix, &tag.local_name));
                session.content_placeholders.push(id);
                let type_name = QualifiedName::parse(CONTENT_PLACEHOLDER_TYPE);
                Some(self.typed(session, tag, type_name, info))
            }
            Resolution::Known(info) => {
                Some(self.typed(session, tag, info.type_name.clone(), Some(info)))
            }
            Resolution::UserControl(type_name) | Resolution::Html(type_name) => {
                Some(self.typed(session, tag, type_name, None))
            }
            Resolution::Script => {
                self.script(session, tag);
                None
            }
            Resolution::Unknown => {
                let message = format!(
                    "Unknown web control: {}:{}",
                    tag.prefix.as_deref().unwrap_or_default(),
                    tag.local_name
                );
                session
                    .errors
                    .push(PageError::new(message, self.location(tag.span)));
                None
            }
        }
    }

    fn typed(
        &self,
        session: &mut Session,
        tag: &Tag,
        type_name: QualifiedName,
        info: Option<&ControlInfo>,
    ) -> Control {
        let promote = info.filter(|info| info.children_as_properties);
        let mut properties = Vec::new();
        let mut children = ControlListBuilder::new();

        for child in &tag.children {
            if let (Some(info), Node::HtmlTag(element)) = (promote, child) {
                if let Some(data_type) = info.data_type(&element.local_name) {
                    properties.push(self.property(session, element, data_type));
                    continue;
                }
            }
            children.add(self.visit(session, child));
        }

        Control::Typed(TypedControl {
            type_name,
            location: self.location(tag.full_span()),
            id: control_id(tag),
            attributes: self.attributes(tag, info),
            properties,
            children: children.build(),
        })
    }

    /// A sub-element promoted to a property. Templates keep their literals; other
    /// property values are structure only.
    fn property(&self, session: &mut Session, element: &Tag, data_type: &DataType) -> Control {
        let mut children = if data_type.kind == DataTypeKind::Template {
            ControlListBuilder::new()
        } else {
            ControlListBuilder::dropping_literals()
        };
        for child in &element.children {
            children.add(self.visit(session, child));
        }

        let location = self.location(element.full_span());
        let type_name = data_type.key.as_deref().map_or_else(
            || QualifiedName::new("", element.local_name.clone()),
            QualifiedName::parse,
        );
        let value = TypedControl {
            type_name,
            location: location.clone(),
            id: control_id(element),
            attributes: self.attributes(element, None),
            properties: Vec::new(),
            children: children.build(),
        };
        Control::Property(Property {
            name: element.local_name.to_string(),
            value: Box::new(Control::Typed(value)),
            location,
        })
    }

    fn attributes(&self, tag: &Tag, info: Option<&ControlInfo>) -> Vec<TypedAttribute> {
        tag.attributes
            .iter()
            .filter(|a| !a.name.eq_ignore_ascii_case("runat"))
            .map(|a| TypedAttribute {
                name: a.name.to_string(),
                value: a.value.clone(),
                data_type: info.and_then(|info| info.data_type(&a.name)).cloned(),
                location: self.location(a.span),
            })
            .collect()
    }

    /// `<asp:Content ContentPlaceHolderID="Main">` becomes a template; nothing is
    /// added to the tree.
    fn content(&self, session: &mut Session, tag: &Tag) {
        let location = self.location(tag.full_span());
        let Some(placeholder_id) = tag
            .attribute_text("ContentPlaceHolderID")
            .filter(|id| !id.is_empty())
        else {
            session.errors.push(PageError::new(
                format!("{} is missing the ContentPlaceHolderID attribute", tag.name),
                self.location(tag.span),
            ));
            return;
        };

        // Nested blocks are collected while visiting; keep this one ahead of them.
        let slot = session.templates.len();
        let mut controls = ControlListBuilder::new();
        for child in &tag.children {
            controls.add(self.visit(session, child));
        }
        session.templates.insert(slot, Template {
            id: control_id(tag),
            placeholder_id: placeholder_id.to_string(),
            controls: controls.build(),
            location,
        });
    }

    /// `<script runat="server">` content is kept as source lines.
    fn script(&self, session: &mut Session, tag: &Tag) {
        let mut lines = Vec::new();
        for child in &tag.children {
            let Node::Literal(literal) = child else {
                continue;
            };
            let mut offset = literal.span.start_index();
            for line in literal.text.split('\n') {
                let text = line.strip_suffix('\r').unwrap_or(line);
                lines.push(TextLine {
                    text: text.to_string(),
                    location: self.location(Span::from_offsets(offset, offset + text.len())),
                });
                offset += line.len() + 1;
            }
        }
        session.scripts.push(Script {
            lines,
            location: self.location(tag.full_span()),
        });
    }
}

fn control_id(tag: &Tag) -> Option<String> {
    tag.attribute_text("ID")
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_info::ControlRegistry;
    use aspx_parser::parse;
    use pretty_assertions::assert_eq;
    use source_location::Position;

    fn visit_page(source: &str) -> (RootControl, Session) {
        let registry = ControlRegistry::with_standard_controls();
        let path = Utf8Path::new("Default.aspx");
        let creator = SymbolCreator::new(path, source, &registry);
        let mut session = Session::default();
        let root = creator.root(&mut session, &parse(source).root);
        (root, session)
    }

    #[test]
    fn test_location_conversion() {
        let registry = ControlRegistry::new();
        let source = "ab\ncd<% x %>";
        let creator = SymbolCreator::new(Utf8Path::new("a.aspx"), source, &registry);
        let location = creator.location(Span::from_offsets(5, 12));
        assert_eq!(location.start, Position::new(2, 2));
        assert_eq!(location.end, Position::new(2, 9));
        assert_eq!(location.path, "a.aspx");
    }

    #[test]
    fn test_code_forms() {
        let (root, _) = visit_page("<% a %><%= b %><%: c %><%# d %>");
        assert_eq!(root.children.len(), 1);
        assert!(matches!(&root.children[0], Control::Code(code) if code.code == " c "));
    }

    #[test]
    fn test_markup_children_are_visited() {
        let (root, _) = visit_page(r#"<div class="x"><asp:Label ID="l" runat="server" /></div>"#);
        assert_eq!(root.children.len(), 3);
        assert!(matches!(&root.children[0], Control::Literal(l) if l.text == r#"<div class="x">"#));
        assert_eq!(root.children[1].id(), Some("l"));
        assert!(matches!(&root.children[2], Control::Literal(l) if l.text == "</div>"));
    }

    #[test]
    fn test_typed_attributes() {
        let (root, _) = visit_page(r#"<asp:HyperLink ID="h" runat="server" NavigateUrl="~/" Data-X="1" />"#);
        let Control::Typed(link) = &root.children[0] else {
            panic!("expected typed control");
        };
        let names: Vec<_> = link.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["ID", "NavigateUrl", "Data-X"]);
        assert_eq!(
            link.attribute("navigateurl").and_then(|a| a.data_type.as_ref()),
            Some(&DataType::new(DataTypeKind::Url))
        );
        assert_eq!(link.attribute("Data-X").unwrap().data_type, None);
    }

    #[test]
    fn test_html_open_at_end_of_input_gets_closing_literal() {
        let (root, session) = visit_page("<div><p>text");
        assert!(session.errors.is_empty());
        let Control::Literal(literal) = &root.children[0] else {
            panic!("expected literal");
        };
        assert_eq!(literal.text, "<div><p>text</p></div>");
        assert_eq!(literal.location.start, Position::new(1, 0));
        assert_eq!(literal.location.end, Position::new(1, 12));
    }

    #[test]
    fn test_implicitly_closed_html_gets_no_closing_literal() {
        let (root, _) = visit_page("<div><p>text</div>");
        let Control::Literal(literal) = &root.children[0] else {
            panic!("expected literal");
        };
        assert_eq!(literal.text, "<div><p>text</div>");
    }

    #[test]
    fn test_register_directive() {
        let source = r#"<%@ Register TagPrefix="uc" TagName="Header" Src="~/Controls/Header.ascx" %><uc:Header ID="h" runat="server" />"#;
        let (root, session) = visit_page(source);
        assert!(session.errors.is_empty());
        assert_eq!(session.additional_files, vec![Utf8PathBuf::from("Controls/Header.ascx")]);
        let Control::Typed(header) = &root.children[0] else {
            panic!("expected typed control");
        };
        assert_eq!(header.type_name.to_string(), "ASP.header_ascx");
    }

    #[test]
    fn test_user_control_used_before_register_is_unknown() {
        let source = r#"<uc:Header runat="server" /><%@ Register TagPrefix="uc" TagName="Header" Src="Header.ascx" %>"#;
        let (_, session) = visit_page(source);
        assert_eq!(session.errors[0].message, "Unknown web control: uc:Header");
    }

    #[test]
    fn test_content_without_placeholder_id() {
        let (root, session) = visit_page(r#"<asp:Content ID="c" runat="server">x</asp:Content>"#);
        assert!(root.children.is_empty());
        assert!(session.templates.is_empty());
        assert_eq!(
            session.errors[0].message,
            "asp:Content is missing the ContentPlaceHolderID attribute"
        );
    }

    #[test]
    fn test_script_lines() {
        let source = "<script runat=\"server\">\r\nint a;\r\nint b;\r\n</script>";
        let (root, session) = visit_page(source);
        assert!(root.children.is_empty());
        let lines: Vec<_> = session.scripts[0]
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(lines, ["", "int a;", "int b;", ""]);
        assert_eq!(session.scripts[0].lines[1].location.start, Position::new(2, 0));
        assert_eq!(session.scripts[0].lines[1].location.end, Position::new(2, 6));
        assert_eq!(session.scripts[0].lines[0].location.end, Position::new(1, 23));
    }

    #[test]
    fn test_nested_content_blocks_keep_source_order() {
        let source = r#"<asp:Content ContentPlaceHolderID="M"><asp:Content ContentPlaceHolderID="N">y</asp:Content></asp:Content><asp:Content ContentPlaceHolderID="O" />"#;
        let (_, session) = visit_page(source);
        let placeholders: Vec<_> = session
            .templates
            .iter()
            .map(|t| t.placeholder_id.as_str())
            .collect();
        assert_eq!(placeholders, ["M", "N", "O"]);
        assert!(session.templates[0].controls.is_empty());
        assert!(matches!(&session.templates[1].controls[0], Control::Literal(l) if l.text == "y"));
    }
}
