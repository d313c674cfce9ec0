//! The built-in `asp:` web controls.

use crate::control_info::{ControlInfo, ControlRegistry, DataType, DataTypeKind, QualifiedName};
use DataTypeKind::*;

/// The prefix the standard controls are registered under.
pub const STANDARD_PREFIX: &str = "asp";

/// Namespace of the standard web controls.
pub const WEB_CONTROLS_NAMESPACE: &str = "System.Web.UI.WebControls";

type Attribute = (&'static str, DataTypeKind, Option<&'static str>);

struct StandardControl {
    name: &'static str,
    /// Whether the control derives from `WebControl` and takes its styling attributes.
    web_control: bool,
    children_as_properties: bool,
    attributes: &'static [Attribute],
}

const WEB_CONTROL_ATTRIBUTES: &[Attribute] = &[
    ("ID", String, None),
    ("CssClass", String, None),
    ("ToolTip", String, None),
    ("Visible", Boolean, None),
    ("Enabled", Boolean, None),
    ("EnableViewState", Boolean, None),
    ("Width", Unit, None),
    ("Height", Unit, None),
    ("BackColor", Color, None),
    ("ForeColor", Color, None),
];

const TEMPLATE: Option<&str> = Some("System.Web.UI.ITemplate");

const STANDARD_CONTROLS: &[StandardControl] = &[
    StandardControl {
        name: "Label",
        web_control: true,
        children_as_properties: false,
        attributes: &[("Text", String, None), ("AssociatedControlID", String, None)],
    },
    StandardControl {
        name: "TextBox",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("TextMode", Enum, Some("System.Web.UI.WebControls.TextBoxMode")),
            ("MaxLength", Number, None),
            ("Rows", Number, None),
            ("Columns", Number, None),
            ("ReadOnly", Boolean, None),
            ("AutoPostBack", Boolean, None),
            ("OnTextChanged", Event, None),
        ],
    },
    StandardControl {
        name: "Button",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("CommandName", String, None),
            ("CommandArgument", String, None),
            ("CausesValidation", Boolean, None),
            ("ValidationGroup", String, None),
            ("PostBackUrl", Url, None),
            ("OnClientClick", String, None),
            ("OnClick", Event, None),
            ("OnCommand", Event, None),
        ],
    },
    StandardControl {
        name: "LinkButton",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("CommandName", String, None),
            ("CommandArgument", String, None),
            ("CausesValidation", Boolean, None),
            ("PostBackUrl", Url, None),
            ("OnClick", Event, None),
            ("OnCommand", Event, None),
        ],
    },
    StandardControl {
        name: "Panel",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("DefaultButton", String, None),
            ("GroupingText", String, None),
            ("ScrollBars", Enum, Some("System.Web.UI.WebControls.ScrollBars")),
        ],
    },
    StandardControl {
        name: "HyperLink",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("NavigateUrl", Url, None),
            ("ImageUrl", Url, None),
            ("Target", String, None),
        ],
    },
    StandardControl {
        name: "Literal",
        web_control: false,
        children_as_properties: false,
        attributes: &[
            ("ID", String, None),
            ("Visible", Boolean, None),
            ("Text", String, None),
            ("Mode", Enum, Some("System.Web.UI.WebControls.LiteralMode")),
        ],
    },
    StandardControl {
        name: "Image",
        web_control: true,
        children_as_properties: false,
        attributes: &[("ImageUrl", Url, None), ("AlternateText", String, None)],
    },
    StandardControl {
        name: "CheckBox",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("Checked", Boolean, None),
            ("AutoPostBack", Boolean, None),
            ("OnCheckedChanged", Event, None),
        ],
    },
    StandardControl {
        name: "RadioButton",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("Checked", Boolean, None),
            ("GroupName", String, None),
            ("AutoPostBack", Boolean, None),
            ("OnCheckedChanged", Event, None),
        ],
    },
    StandardControl {
        name: "DropDownList",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("DataSourceID", String, None),
            ("DataTextField", String, None),
            ("DataValueField", String, None),
            ("AutoPostBack", Boolean, None),
            ("OnSelectedIndexChanged", Event, None),
        ],
    },
    StandardControl {
        name: "ListItem",
        web_control: false,
        children_as_properties: false,
        attributes: &[
            ("Text", String, None),
            ("Value", String, None),
            ("Selected", Boolean, None),
            ("Enabled", Boolean, None),
        ],
    },
    StandardControl {
        name: "HiddenField",
        web_control: false,
        children_as_properties: false,
        attributes: &[
            ("ID", String, None),
            ("Value", String, None),
            ("OnValueChanged", Event, None),
        ],
    },
    StandardControl {
        name: "FileUpload",
        web_control: true,
        children_as_properties: false,
        attributes: &[("AllowMultiple", Boolean, None)],
    },
    StandardControl {
        name: "PlaceHolder",
        web_control: false,
        children_as_properties: false,
        attributes: &[("ID", String, None), ("Visible", Boolean, None)],
    },
    StandardControl {
        name: "ContentPlaceHolder",
        web_control: false,
        children_as_properties: false,
        attributes: &[("ID", String, None)],
    },
    StandardControl {
        name: "RequiredFieldValidator",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("ControlToValidate", String, None),
            ("ErrorMessage", String, None),
            ("Text", String, None),
            ("ValidationGroup", String, None),
            ("Display", Enum, Some("System.Web.UI.WebControls.ValidatorDisplay")),
        ],
    },
    StandardControl {
        name: "ValidationSummary",
        web_control: true,
        children_as_properties: false,
        attributes: &[
            ("HeaderText", String, None),
            ("ShowMessageBox", Boolean, None),
            ("ValidationGroup", String, None),
        ],
    },
    StandardControl {
        name: "Repeater",
        web_control: false,
        children_as_properties: true,
        attributes: &[
            ("ID", String, None),
            ("Visible", Boolean, None),
            ("DataSourceID", String, None),
            ("OnItemCommand", Event, None),
            ("OnItemDataBound", Event, None),
            ("HeaderTemplate", Template, TEMPLATE),
            ("ItemTemplate", Template, TEMPLATE),
            ("AlternatingItemTemplate", Template, TEMPLATE),
            ("SeparatorTemplate", Template, TEMPLATE),
            ("FooterTemplate", Template, TEMPLATE),
        ],
    },
    StandardControl {
        name: "GridView",
        web_control: true,
        children_as_properties: true,
        attributes: &[
            ("AutoGenerateColumns", Boolean, None),
            ("AllowPaging", Boolean, None),
            ("AllowSorting", Boolean, None),
            ("PageSize", Number, None),
            ("DataKeyNames", String, None),
            ("DataSourceID", String, None),
            ("OnRowCommand", Event, None),
            ("OnRowDataBound", Event, None),
            ("OnPageIndexChanging", Event, None),
            (
                "Columns",
                Collection,
                Some("System.Web.UI.WebControls.DataControlFieldCollection"),
            ),
            ("EmptyDataTemplate", Template, TEMPLATE),
            ("HeaderStyle", Object, Some("System.Web.UI.WebControls.TableItemStyle")),
            ("RowStyle", Object, Some("System.Web.UI.WebControls.TableItemStyle")),
            (
                "AlternatingRowStyle",
                Object,
                Some("System.Web.UI.WebControls.TableItemStyle"),
            ),
            ("PagerSettings", Object, Some("System.Web.UI.WebControls.PagerSettings")),
        ],
    },
    StandardControl {
        name: "BoundField",
        web_control: false,
        children_as_properties: true,
        attributes: &[
            ("DataField", String, None),
            ("HeaderText", String, None),
            ("DataFormatString", String, None),
            ("SortExpression", String, None),
            ("ReadOnly", Boolean, None),
            ("Visible", Boolean, None),
        ],
    },
    StandardControl {
        name: "TemplateField",
        web_control: false,
        children_as_properties: true,
        attributes: &[
            ("HeaderText", String, None),
            ("SortExpression", String, None),
            ("Visible", Boolean, None),
            ("HeaderTemplate", Template, TEMPLATE),
            ("ItemTemplate", Template, TEMPLATE),
            ("EditItemTemplate", Template, TEMPLATE),
            ("FooterTemplate", Template, TEMPLATE),
        ],
    },
];

impl ControlRegistry {
    /// Creates a registry holding the standard `asp:` web controls.
    pub fn with_standard_controls() -> Self {
        let mut registry = Self::new();
        for control in STANDARD_CONTROLS {
            registry.register(STANDARD_PREFIX, control.name, standard_info(control));
        }
        registry
    }
}

fn standard_info(control: &StandardControl) -> ControlInfo {
    let common: &[Attribute] = if control.web_control {
        WEB_CONTROL_ATTRIBUTES
    } else {
        &[]
    };
    common.iter().chain(control.attributes).fold(
        ControlInfo::new(QualifiedName::new(WEB_CONTROLS_NAMESPACE, control.name))
            .with_children_as_properties(control.children_as_properties),
        |info, (name, kind, key)| {
            let data_type = match key {
                Some(key) => DataType::keyed(*kind, *key),
                None => DataType::new(*kind),
            };
            info.with_data_type(name, data_type)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_info::ControlLookup;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_standard_controls_registered() {
        let registry = ControlRegistry::with_standard_controls();
        assert_eq!(registry.len(), STANDARD_CONTROLS.len());

        let label = registry.try_get_control("asp", "Label").unwrap();
        assert_eq!(label.type_name.to_string(), "System.Web.UI.WebControls.Label");
        assert!(!label.children_as_properties);
        assert_eq!(label.data_type("Text"), Some(&DataType::new(String)));
        assert_eq!(label.data_type("Visible"), Some(&DataType::new(Boolean)));
    }

    #[test]
    fn test_grid_view_properties() {
        let registry = ControlRegistry::with_standard_controls();
        let grid = registry.try_get_control("asp", "gridview").unwrap();
        assert!(grid.children_as_properties);
        assert_eq!(
            grid.data_type("Columns"),
            Some(&DataType::keyed(
                Collection,
                "System.Web.UI.WebControls.DataControlFieldCollection"
            ))
        );
        assert_eq!(grid.data_type("EmptyDataTemplate").map(|t| t.kind), Some(Template));
    }

    #[test]
    fn test_non_web_controls_skip_styling() {
        let registry = ControlRegistry::with_standard_controls();
        let literal = registry.try_get_control("asp", "Literal").unwrap();
        assert_eq!(literal.data_type("CssClass"), None);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = STANDARD_CONTROLS
            .iter()
            .map(|c| c.name.to_ascii_lowercase())
            .collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), STANDARD_CONTROLS.len());
    }
}
