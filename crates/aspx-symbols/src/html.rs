//! Control types for plain HTML elements marked `runat="server"`.

use crate::control_info::QualifiedName;

/// Namespace of the HTML server controls.
pub const HTML_CONTROLS_NAMESPACE: &str = "System.Web.UI.HtmlControls";

const GENERIC: &str = "HtmlGenericControl";

/// Maps an element name (and its `type` attribute, for `<input>`) to a control type.
///
/// Elements without a dedicated control map to `HtmlGenericControl`.
pub fn html_control_type(element: &str, input_type: Option<&str>) -> QualifiedName {
    QualifiedName::new(HTML_CONTROLS_NAMESPACE, html_control_name(element, input_type))
}

fn html_control_name(element: &str, input_type: Option<&str>) -> &'static str {
    match element.to_ascii_lowercase().as_str() {
        "a" => "HtmlAnchor",
        "button" => "HtmlButton",
        "form" => "HtmlForm",
        "head" => "HtmlHead",
        "iframe" => "HtmlIframe",
        "img" => "HtmlImage",
        "input" => input_control_name(input_type.unwrap_or("text")),
        "link" => "HtmlLink",
        "meta" => "HtmlMeta",
        "select" => "HtmlSelect",
        "table" => "HtmlTable",
        "td" | "th" => "HtmlTableCell",
        "tr" => "HtmlTableRow",
        "textarea" => "HtmlTextArea",
        "title" => "HtmlTitle",
        _ => GENERIC,
    }
}

fn input_control_name(input_type: &str) -> &'static str {
    match input_type.to_ascii_lowercase().as_str() {
        "button" => "HtmlInputButton",
        "submit" => "HtmlInputSubmit",
        "reset" => "HtmlInputReset",
        "checkbox" => "HtmlInputCheckBox",
        "file" => "HtmlInputFile",
        "hidden" => "HtmlInputHidden",
        "image" => "HtmlInputImage",
        "password" => "HtmlInputPassword",
        "radio" => "HtmlInputRadioButton",
        "text" => "HtmlInputText",
        _ => "HtmlInputGenericControl",
    }
}
