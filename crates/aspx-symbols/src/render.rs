//! Compact text rendering of a parsed page, for debugging output and tests.

use crate::control::{Control, TypedAttribute};
use crate::page::ParsedPage;
use aspx_parser::AttributeValue;

/// Renders the control tree, templates and scripts of a page, one node per line.
pub fn render_tree(page: &ParsedPage) -> String {
    let mut output = String::new();
    for control in &page.root.children {
        render_control(&mut output, control, 0);
    }
    for template in &page.templates {
        output.push_str(&format!(
            "Template {} -> {}\n",
            template.id.as_deref().unwrap_or("-"),
            template.placeholder_id
        ));
        for control in &template.controls {
            render_control(&mut output, control, 1);
        }
    }
    for script in &page.scripts {
        output.push_str(&format!("Script ({} lines)\n", script.lines.len()));
    }
    output
}

fn render_control(output: &mut String, control: &Control, depth: usize) {
    let indent = "  ".repeat(depth);
    match control {
        Control::Root(root) => {
            output.push_str(&format!("{indent}Root\n"));
            for child in &root.children {
                render_control(output, child, depth + 1);
            }
        }
        Control::Literal(literal) => {
            output.push_str(&format!("{indent}Literal {:?}\n", literal.text));
        }
        Control::Code(code) => {
            output.push_str(&format!("{indent}Code {:?}\n", code.code));
        }
        Control::Typed(typed) => {
            output.push_str(&format!("{indent}{}", typed.type_name));
            if let Some(id) = &typed.id {
                output.push_str(&format!("#{id}"));
            }
            for attribute in &typed.attributes {
                output.push_str(&render_attribute(attribute));
            }
            output.push('\n');
            for property in &typed.properties {
                render_control(output, property, depth + 1);
            }
            for child in &typed.children {
                render_control(output, child, depth + 1);
            }
        }
        Control::Property(property) => {
            output.push_str(&format!("{indent}.{} =\n", property.name));
            render_control(output, &property.value, depth + 1);
        }
    }
}

fn render_attribute(attribute: &TypedAttribute) -> String {
    match &attribute.value {
        AttributeValue::Empty => format!(" {}", attribute.name),
        AttributeValue::Text(text) => format!(" {}={:?}", attribute.name, text),
        AttributeValue::DataBinding { expression, encode } => format!(
            " {}=<%#{}{}%>",
            attribute.name,
            if *encode { ":" } else { "" },
            expression
        ),
    }
}
