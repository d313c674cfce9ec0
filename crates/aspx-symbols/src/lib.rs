//! Symbol tree construction for ASP.NET Web Forms pages.
//!
//! [`parse_page`] runs the whole pipeline for one page: the markup is parsed into a
//! raw tree, every node is resolved against a [`ControlLookup`], and the result is an
//! immutable [`ParsedPage`] holding the control tree, content templates, server
//! scripts and every error found along the way.
//!
//! # Example
//!
//! ```
//! use aspx_symbols::{parse_page, Control, ControlRegistry};
//!
//! let registry = ControlRegistry::with_standard_controls();
//! let page = parse_page(
//!     "Default.aspx",
//!     r#"<p>Hello <asp:Label ID="Name" runat="server" /></p>"#,
//!     &registry,
//! );
//!
//! assert!(page.errors.is_empty());
//! assert_eq!(page.root.children[1].id(), Some("Name"));
//! ```

mod builder;
mod control;
mod control_info;
mod creator;
mod html;
mod page;
mod render;
mod resolver;
mod standard;

pub use aspx_parser::AttributeValue;
pub use builder::ControlListBuilder;
pub use control::{
    CodeControl, Control, LiteralControl, Property, RootControl, Script, Template, TextLine,
    TypedAttribute, TypedControl,
};
pub use control_info::{
    ControlInfo, ControlLookup, ControlRegistry, DataType, DataTypeKind, QualifiedName,
};
pub use html::{html_control_type, HTML_CONTROLS_NAMESPACE};
pub use page::{resolve_virtual_path, user_control_type, PageDirective, PageError, ParsedPage};
pub use render::render_tree;
pub use resolver::{resolve, Resolution, UserControls, CONTENT_PLACEHOLDER_TYPE};
pub use source_location::{Location, Position};
pub use standard::{STANDARD_PREFIX, WEB_CONTROLS_NAMESPACE};

use aspx_parser::MAIN_DIRECTIVES;
use camino::Utf8Path;
use creator::{Session, SymbolCreator};

/// Parses one page into its symbol tree.
///
/// `path` only tags locations and anchors relative references; it does not need
/// to exist. Markup problems never fail the parse: they are collected in
/// [`ParsedPage::errors`] next to the best-effort tree.
///
/// # Panics
///
/// Panics only on internal invariant violations, never on malformed markup.
pub fn parse_page<L: ControlLookup + ?Sized>(
    path: impl AsRef<Utf8Path>,
    contents: &str,
    lookup: &L,
) -> ParsedPage {
    let path = path.as_ref();
    let parsed = aspx_parser::parse(contents);
    let creator = SymbolCreator::new(path, contents, lookup);
    let mut session = Session::default();
    let root = creator.root(&mut session, &parsed.root);

    let mut errors: Vec<PageError> = parsed
        .errors
        .iter()
        .map(|error| PageError::new(error.to_string(), creator.location(error.span)))
        .collect();
    errors.append(&mut session.errors);
    errors.sort_by_key(|error| error.location.start);

    let directive = session
        .directives
        .iter()
        .find(|directive| MAIN_DIRECTIVES.iter().any(|name| directive.is_named(name)))
        .cloned();

    let page = ParsedPage {
        path: path.to_owned(),
        master_page: None,
        directive,
        directives: session.directives,
        root,
        errors,
        templates: session.templates,
        scripts: session.scripts,
        content_placeholders: session.content_placeholders,
        additional_files: Vec::new(),
    }
    .with_master_page();
    let page = session
        .additional_files
        .into_iter()
        .fold(page, |page, file| page.with_additional_file(file));

    tracing::debug!(
        path = %page.path,
        errors = page.errors.len(),
        templates = page.templates.len(),
        scripts = page.scripts.len(),
        "parsed page"
    );
    page
}
