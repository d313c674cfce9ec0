//! Builds the symbol tree of every fixture page.

use aspx_symbols::{parse_page, Control, ControlRegistry, ParsedPage};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

fn fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fixtures")
}

fn parse_fixture(relative: &str) -> ParsedPage {
    let path = fixtures_dir().join("valid").join(relative);
    let source = fs::read_to_string(&path).expect("Failed to read file");
    parse_page(
        Utf8Path::new(relative),
        &source,
        &ControlRegistry::with_standard_controls(),
    )
}

fn no_adjacent_literals(controls: &[Control]) -> bool {
    controls
        .windows(2)
        .all(|pair| !matches!(pair, [Control::Literal(_), Control::Literal(_)]))
        && controls.iter().all(|control| {
            !matches!(control, Control::Root(_)) && no_adjacent_literals(control.children())
        })
}

#[test]
fn test_master_page_fixture() {
    let page = parse_fixture("Site.master");
    assert!(page.errors.is_empty(), "errors: {:?}", page.errors);
    assert_eq!(page.directive.as_ref().unwrap().name, "Master");
    assert_eq!(page.content_placeholders, ["HeadContent", "MainContent"]);
    assert_eq!(
        page.additional_files,
        vec![Utf8PathBuf::from("Controls/Header.ascx")]
    );
    assert!(no_adjacent_literals(&page.root.children));
}

#[test]
fn test_content_page_fixture() {
    let page = parse_fixture("Default.aspx");
    assert!(page.errors.is_empty(), "errors: {:?}", page.errors);
    assert_eq!(page.master_page, Some(Utf8PathBuf::from("Site.master")));

    let placeholders: Vec<_> = page
        .templates
        .iter()
        .map(|t| t.placeholder_id.as_str())
        .collect();
    assert_eq!(placeholders, ["HeadContent", "MainContent"]);
    assert_eq!(page.scripts.len(), 1);
    assert!(page.scripts[0].text().contains("RefreshButton_Click"));

    // Only whitespace remains outside the content blocks.
    assert!(page.root.children.iter().all(|control| matches!(
        control,
        Control::Literal(literal) if literal.text.trim().is_empty()
    )));
    for template in &page.templates {
        assert!(no_adjacent_literals(&template.controls));
    }
}

#[test]
fn test_user_control_fixture() {
    let page = parse_fixture("Controls/Header.ascx");
    assert!(page.errors.is_empty(), "errors: {:?}", page.errors);
    assert_eq!(page.directive.as_ref().unwrap().name, "Control");

    let ids: Vec<_> = page.root.children.iter().filter_map(Control::id).collect();
    assert_eq!(ids, ["HomeLink", "UserName"]);
}

#[test]
fn test_invalid_fixture_reports_every_problem() {
    let path = fixtures_dir().join("invalid/Broken.aspx");
    let source = fs::read_to_string(&path).expect("Failed to read file");
    let page = parse_page(
        "Broken.aspx",
        &source,
        &ControlRegistry::with_standard_controls(),
    );

    let messages: Vec<_> = page.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "duplicate attribute: id",
            "unexpected closing tag: </asp:Repeater>",
            "Unknown web control: asp:Widget",
            "unterminated code block",
        ]
    );
}
