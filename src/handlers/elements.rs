//! Selected element handlers

use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::{bridge::Bridge, protocol::ElementRecord, tools::success_response};

pub async fn handle_get_selected_elements(bridge: &Bridge) -> Result<CallToolResult, McpError> {
    let elements = bridge.elements().snapshot();
    if elements.is_empty() {
        return Ok(success_response(
            "No elements have been selected. Use the Element Selector in the browser extension to select elements."
                .to_string(),
        ));
    }

    let formatted = elements
        .iter()
        .enumerate()
        .map(|(index, element)| format_element(index + 1, element))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(success_response(format!(
        "Selected Elements ({}):\n\n{formatted}",
        elements.len()
    )))
}

pub async fn handle_clear_selected_elements(bridge: &Bridge) -> Result<CallToolResult, McpError> {
    let cleared = bridge.elements().clear();
    tracing::info!("Cleared {} selected elements", cleared);
    Ok(success_response(
        "Successfully cleared all selected elements.".to_string(),
    ))
}

fn or_none(value: &str) -> &str {
    if value.is_empty() { "none" } else { value }
}

fn format_element(position: usize, element: &ElementRecord) -> String {
    let classes = element.classes.join(", ");
    let attributes = element
        .attributes
        .iter()
        .map(|attr| format!("{}=\"{}\"", attr.name, attr.value))
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = format!(
        "Element {position}:\n  Tag: {}\n  ID: {}\n  Classes: {}\n  Text: {}\n  Attributes: {}\n",
        element.tag,
        or_none(&element.id),
        or_none(&classes),
        or_none(&element.text),
        or_none(&attributes),
    );
    if let Some(instruction) = element.instruction.as_deref().filter(|i| !i.is_empty()) {
        out.push_str(&format!("  Instruction: {instruction}\n"));
    }
    out
}
