//! Behavioral properties of `parse_page`.

use aspx_symbols::{parse_page, Control, ControlRegistry, Position};
use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn parse(source: &str) -> aspx_symbols::ParsedPage {
    parse_page("Default.aspx", source, &ControlRegistry::with_standard_controls())
}

proptest! {
    #[test]
    fn test_text_runs_merge_into_one_literal(
        runs in prop::collection::vec("[a-zA-Z0-9 .,]{1,10}", 1..8)
    ) {
        let source = runs.join(" < ");
        let page = parse(&source);

        prop_assert!(page.errors.is_empty());
        prop_assert_eq!(page.root.children.len(), 1);
        match &page.root.children[0] {
            Control::Literal(literal) => prop_assert_eq!(&literal.text, &source),
            other => prop_assert!(false, "expected literal, got {:?}", other),
        }
    }
}

#[test]
fn test_plain_html_round_trips() {
    let source = r#"<div class="x">hi</div>"#;
    let page = parse(source);
    assert_eq!(page.root.children.len(), 1);
    let Control::Literal(literal) = &page.root.children[0] else {
        panic!("expected literal");
    };
    assert_eq!(literal.text, source);
    assert_eq!(literal.location.start, Position::new(1, 0));
    assert_eq!(literal.location.end, Position::new(1, 23));
}

#[test]
fn test_unknown_control_reports_one_error() {
    let page = parse(r#"a<foo:Bar ID="b" runat="server">inner</foo:Bar>c"#);
    let messages: Vec<_> = page.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, ["Unknown web control: foo:Bar"]);

    let Control::Literal(literal) = &page.root.children[0] else {
        panic!("expected literal");
    };
    assert_eq!(page.root.children.len(), 1);
    assert_eq!(literal.text, "ac");
}

#[test]
fn test_content_placeholder_registration() {
    let page = parse(r#"<asp:ContentPlaceHolder ID="Main" runat="server" />"#);
    assert_eq!(page.content_placeholders, ["Main"]);
    assert_eq!(page.root.children.len(), 1);
    let Control::Typed(placeholder) = &page.root.children[0] else {
        panic!("expected typed control");
    };
    assert_eq!(placeholder.id.as_deref(), Some("Main"));
    assert_eq!(
        placeholder.type_name.to_string(),
        "System.Web.UI.WebControls.ContentPlaceHolder"
    );
}

#[test]
fn test_content_block_extraction() {
    let page = parse(r#"<asp:Content ID="C1" ContentPlaceHolderID="Main" runat="server">Hello</asp:Content>"#);
    assert!(page.root.children.is_empty());
    assert_eq!(page.templates.len(), 1);

    let template = &page.templates[0];
    assert_eq!(template.id.as_deref(), Some("C1"));
    assert_eq!(template.placeholder_id, "Main");
    assert_eq!(template.controls.len(), 1);
    assert!(matches!(&template.controls[0], Control::Literal(l) if l.text == "Hello"));
}

#[test]
fn test_master_page_dependency() {
    let page = parse(r#"<%@ Page MasterPageFile="~/Site.master" %>"#);
    assert_eq!(page.master_page, Some(Utf8PathBuf::from("Site.master")));
    assert!(page
        .additional_files
        .contains(&Utf8PathBuf::from("Site.master")));
}

#[test]
fn test_position_accuracy() {
    let page = parse("ab\ncd<%: x %>");
    let Control::Code(code) = &page.root.children[1] else {
        panic!("expected code control");
    };
    assert_eq!(code.location.start, Position::new(2, 2));
    assert_eq!(code.location.end, Position::new(2, 10));
    assert_eq!(code.location.to_string(), "Default.aspx(2,3)");
}

#[test]
fn test_reparse_is_equal() {
    let source = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../test-fixtures/valid/Default.aspx"
    ))
    .unwrap();
    assert_eq!(parse(&source), parse(&source));
}

#[test]
fn test_concurrent_parses_are_independent() {
    let registry = &ControlRegistry::with_standard_controls();
    let sources = [
        r#"<asp:ContentPlaceHolder ID="One" runat="server" />"#,
        r#"<asp:Widget runat="server" />"#,
        r#"<asp:Content ContentPlaceHolderID="Two" runat="server">x</asp:Content>"#,
    ];

    let sequential: Vec<_> = sources
        .iter()
        .map(|source| parse_page("Page.aspx", source, registry))
        .collect();
    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = sources
            .iter()
            .map(|&source| scope.spawn(move || parse_page("Page.aspx", source, registry)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
    assert_eq!(concurrent[0].content_placeholders, ["One"]);
    assert_eq!(concurrent[1].errors.len(), 1);
    assert!(concurrent[1].content_placeholders.is_empty());
    assert_eq!(concurrent[2].templates.len(), 1);
}

#[test]
fn test_property_promotion() {
    let source = r#"<asp:Repeater ID="R" runat="server"><ItemTemplate> <%#: Item %> </ItemTemplate><Unknown /></asp:Repeater>"#;
    let page = parse(source);
    let Control::Typed(repeater) = &page.root.children[0] else {
        panic!("expected typed control");
    };

    assert_eq!(repeater.properties.len(), 1);
    let Control::Property(property) = &repeater.properties[0] else {
        panic!("expected property");
    };
    assert_eq!(property.name, "ItemTemplate");
    let Control::Typed(template) = property.value.as_ref() else {
        panic!("expected typed value");
    };
    assert_eq!(template.type_name.to_string(), "System.Web.UI.ITemplate");
    assert_eq!(template.children.len(), 1);

    assert!(matches!(&repeater.children[0], Control::Literal(l) if l.text == "<Unknown />"));
}
