//! Control metadata and the lookup capability the symbol creator consumes.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// A namespace-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    /// The namespace, empty for unqualified names.
    pub namespace: SmolStr,
    /// The type name.
    pub name: SmolStr,
}

impl QualifiedName {
    /// Creates a qualified name from its parts.
    pub fn new(namespace: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Splits a dotted name at its last `.`.
    pub fn parse(full_name: &str) -> Self {
        match full_name.rsplit_once('.') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new("", full_name),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// The category of value an attribute or property accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub enum DataTypeKind {
    String,
    Boolean,
    Number,
    Enum,
    Color,
    Unit,
    Url,
    /// A complex property set through sub-element attributes (`<HeaderStyle>`).
    Object,
    /// A list property whose items are child controls (`<Columns>`).
    Collection,
    /// Markup instantiated later (`<ItemTemplate>`).
    Template,
    /// An event handler method name (`OnClick`).
    Event,
}

/// A data type and the key it resolves to, such as an enum or class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataType {
    pub kind: DataTypeKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub key: Option<SmolStr>,
}

impl DataType {
    /// A data type without a key.
    pub fn new(kind: DataTypeKind) -> Self {
        Self { kind, key: None }
    }

    /// A data type resolved to `key`.
    pub fn keyed(kind: DataTypeKind, key: impl Into<SmolStr>) -> Self {
        Self {
            kind,
            key: Some(key.into()),
        }
    }
}

/// What the lookup knows about one control type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlInfo {
    /// The fully qualified type of the control.
    pub type_name: QualifiedName,
    /// Whether plain sub-elements that name a declared property are property
    /// assignments rather than markup children.
    pub children_as_properties: bool,
    /// Data types by ASCII-lowercased attribute or property name.
    data_types: FxHashMap<SmolStr, DataType>,
}

impl ControlInfo {
    /// Creates control info with no declared attributes.
    pub fn new(type_name: QualifiedName) -> Self {
        Self {
            type_name,
            children_as_properties: false,
            data_types: FxHashMap::default(),
        }
    }

    /// Sets whether sub-elements are properties.
    pub fn with_children_as_properties(mut self, children_as_properties: bool) -> Self {
        self.children_as_properties = children_as_properties;
        self
    }

    /// Declares the data type of an attribute or property.
    pub fn with_data_type(mut self, name: &str, data_type: DataType) -> Self {
        self.data_types.insert(lowercase(name), data_type);
        self
    }

    /// Looks up the data type of an attribute or property, ignoring ASCII case.
    pub fn data_type(&self, name: &str) -> Option<&DataType> {
        self.data_types.get(&lowercase(name))
    }
}

/// Maps a `prefix:name` tag to what is known about its control type.
///
/// Implementations are shared read-only between concurrent parses.
pub trait ControlLookup {
    /// Returns the control registered for `prefix:name`, if any.
    fn try_get_control(&self, prefix: &str, name: &str) -> Option<&ControlInfo>;
}

/// An in-memory [`ControlLookup`].
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    controls: FxHashMap<(SmolStr, SmolStr), ControlInfo>,
}

impl ControlRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `info` for `prefix:name`, replacing any previous registration.
    pub fn register(&mut self, prefix: &str, name: &str, info: ControlInfo) {
        self.controls
            .insert((lowercase(prefix), lowercase(name)), info);
    }

    /// Number of registered controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether no control is registered.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl ControlLookup for ControlRegistry {
    fn try_get_control(&self, prefix: &str, name: &str) -> Option<&ControlInfo> {
        self.controls.get(&(lowercase(prefix), lowercase(name)))
    }
}

pub(crate) fn lowercase(text: &str) -> SmolStr {
    if text.bytes().any(|b| b.is_ascii_uppercase()) {
        SmolStr::new(text.to_ascii_lowercase())
    } else {
        SmolStr::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_qualified_name_parse() {
        let name = QualifiedName::parse("System.Web.UI.WebControls.Label");
        assert_eq!(name.namespace, "System.Web.UI.WebControls");
        assert_eq!(name.name, "Label");
        assert_eq!(name.to_string(), "System.Web.UI.WebControls.Label");

        let bare = QualifiedName::parse("Columns");
        assert_eq!(bare.namespace, "");
        assert_eq!(bare.to_string(), "Columns");
    }

    #[test]
    fn test_data_type_lookup_ignores_case() {
        let info = ControlInfo::new(QualifiedName::parse("Demo.Widget"))
            .with_data_type("NavigateUrl", DataType::new(DataTypeKind::Url));
        assert_eq!(
            info.data_type("navigateurl"),
            Some(&DataType::new(DataTypeKind::Url))
        );
        assert_eq!(info.data_type("Text"), None);
    }

    #[test]
    fn test_registry_lookup_ignores_case() {
        let mut registry = ControlRegistry::new();
        registry.register("demo", "Widget", ControlInfo::new(QualifiedName::parse("Demo.Widget")));
        assert_eq!(registry.len(), 1);

        let info = registry.try_get_control("DEMO", "widget").unwrap();
        assert_eq!(info.type_name.to_string(), "Demo.Widget");
        assert!(registry.try_get_control("demo", "Other").is_none());
    }
}
