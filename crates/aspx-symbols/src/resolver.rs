//! Control name resolution: decides what a server tag denotes.

use crate::control_info::{lowercase, ControlInfo, ControlLookup, QualifiedName};
use crate::html::html_control_type;
use aspx_parser::Tag;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Type of the control emitted for a `ContentPlaceHolder`.
pub const CONTENT_PLACEHOLDER_TYPE: &str = "System.Web.UI.WebControls.ContentPlaceHolder";

/// What a server tag resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// `<prefix:Content>`: a template for a master page placeholder.
    Content,
    /// `<prefix:ContentPlaceHolder ID="...">`
    ContentPlaceholder { id: String },
    /// A control known to the lookup.
    Known(&'a ControlInfo),
    /// A user control registered by a `Register` directive on this page.
    UserControl(QualifiedName),
    /// A plain HTML element with `runat="server"`.
    Html(QualifiedName),
    /// `<script runat="server">`
    Script,
    Unknown,
}

/// User controls registered by the page's own `Register` directives.
#[derive(Debug, Clone, Default)]
pub struct UserControls {
    controls: FxHashMap<(SmolStr, SmolStr), QualifiedName>,
}

impl UserControls {
    pub fn register(&mut self, prefix: &str, name: &str, type_name: QualifiedName) {
        self.controls
            .insert((lowercase(prefix), lowercase(name)), type_name);
    }

    pub fn get(&self, prefix: &str, name: &str) -> Option<&QualifiedName> {
        self.controls.get(&(lowercase(prefix), lowercase(name)))
    }
}

/// Resolves a server tag.
///
/// Rules, first match wins:
/// 1. a prefixed `Content` tag;
/// 2. a prefixed `ContentPlaceHolder` tag with a non-empty `ID`;
/// 3. a control from `lookup`;
/// 4. a user control from `user_controls`;
/// 5. for unprefixed tags, `script` or the HTML control table;
/// 6. unknown.
pub fn resolve<'a, L: ControlLookup + ?Sized>(
    tag: &Tag,
    lookup: &'a L,
    user_controls: &UserControls,
) -> Resolution<'a> {
    let Some(prefix) = tag.prefix.as_deref() else {
        if tag.is_named("script") {
            return Resolution::Script;
        }
        return Resolution::Html(html_control_type(&tag.local_name, tag.attribute_text("type")));
    };

    if tag.is_named("Content") {
        return Resolution::Content;
    }
    if tag.is_named("ContentPlaceHolder") {
        if let Some(id) = tag.attribute_text("ID").filter(|id| !id.is_empty()) {
            return Resolution::ContentPlaceholder { id: id.to_string() };
        }
    }
    if let Some(info) = lookup.try_get_control(prefix, &tag.local_name) {
        return Resolution::Known(info);
    }
    if let Some(type_name) = user_controls.get(prefix, &tag.local_name) {
        return Resolution::UserControl(type_name.clone());
    }
    Resolution::Unknown
}
