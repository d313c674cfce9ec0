//! The symbol tree: the immutable output of a page parse.

use crate::control_info::{DataType, QualifiedName};
use aspx_parser::AttributeValue;
use source_location::Location;

/// A node in the symbol tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// A transient container. Flattened away wherever controls are collected.
    Root(RootControl),
    /// Plain text.
    Literal(LiteralControl),
    /// A server control with a resolved type.
    Typed(TypedControl),
    /// An HTML-encoded inline expression (`<%: ... %>`).
    Code(CodeControl),
    /// A sub-element promoted to a property assignment.
    Property(Property),
}

impl Control {
    /// The `ID` of the control, if it has one.
    pub fn id(&self) -> Option<&str> {
        match self {
            Control::Typed(typed) => typed.id.as_deref(),
            Control::Property(property) => property.value.id(),
            Control::Root(_) | Control::Literal(_) | Control::Code(_) => None,
        }
    }

    /// The child controls, empty for leaves.
    pub fn children(&self) -> &[Control] {
        match self {
            Control::Root(root) => &root.children,
            Control::Typed(typed) => &typed.children,
            Control::Literal(_) | Control::Code(_) | Control::Property(_) => &[],
        }
    }

    /// The source location, `None` for a root container.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Control::Root(_) => None,
            Control::Literal(literal) => Some(&literal.location),
            Control::Typed(typed) => Some(&typed.location),
            Control::Code(code) => Some(&code.location),
            Control::Property(property) => Some(&property.location),
        }
    }
}

/// A container of controls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootControl {
    pub children: Vec<Control>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralControl {
    pub text: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedControl {
    pub type_name: QualifiedName,
    /// Covers the opening tag through the closing tag.
    pub location: Location,
    pub id: Option<String>,
    /// Attributes in source order. `runat` is not included.
    pub attributes: Vec<TypedAttribute>,
    /// [`Control::Property`] entries in source order.
    pub properties: Vec<Control>,
    pub children: Vec<Control>,
}

impl TypedControl {
    /// Looks up an attribute by name, ignoring ASCII case.
    pub fn attribute(&self, name: &str) -> Option<&TypedAttribute> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }
}

/// An attribute of a typed control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedAttribute {
    pub name: String,
    pub value: AttributeValue,
    /// The declared data type, `None` when the control declares nothing for this name.
    pub data_type: Option<DataType>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeControl {
    pub code: String,
    pub location: Location,
}

/// A property assignment written as a sub-element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: Box<Control>,
    pub location: Location,
}

/// The body of a `Content` block, bound to a placeholder of the master page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: Option<String>,
    pub placeholder_id: String,
    pub controls: Vec<Control>,
    pub location: Location,
}

/// The source of one `<script runat="server">` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub lines: Vec<TextLine>,
    pub location: Location,
}

impl Script {
    /// The script source with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;
    use source_location::Position;

    fn location() -> Location {
        Location::new("a.aspx", Position::new(1, 0), Position::new(1, 1))
    }

    #[test]
    fn test_property_id_comes_from_value() {
        let value = Control::Typed(TypedControl {
            type_name: QualifiedName::parse("Demo.Style"),
            location: location(),
            id: Some("s".into()),
            attributes: Vec::new(),
            properties: Vec::new(),
            children: Vec::new(),
        });
        let property = Control::Property(Property {
            name: "Style".into(),
            value: Box::new(value),
            location: location(),
        });
        assert_eq!(property.id(), Some("s"));
        assert!(property.children().is_empty());
    }

    #[test]
    fn test_script_text() {
        let script = Script {
            lines: vec![
                TextLine {
                    text: "a".into(),
                    location: location(),
                },
                TextLine {
                    text: "b".into(),
                    location: location(),
                },
            ],
            location: location(),
        };
        assert_eq!(script.text(), "a\nb");
    }
}
