use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use serde_json::{Value, json};

pub struct ToolDefinitions;

impl ToolDefinitions {
    pub fn list_all() -> Vec<Tool> {
        vec![
            Self::capture_screenshot_tool(),
            Self::get_selected_elements_tool(),
            Self::clear_selected_elements_tool(),
            Self::get_connection_status_tool(),
        ]
    }

    fn capture_screenshot_tool() -> Tool {
        Tool::new(
            "capture_screenshot",
            "Capture a screenshot of the current browser tab through the browser extension",
            no_arguments(),
        )
    }

    fn get_selected_elements_tool() -> Tool {
        Tool::new(
            "get_selected_elements",
            "Get information about HTML elements selected using the browser extension",
            no_arguments(),
        )
    }

    fn clear_selected_elements_tool() -> Tool {
        Tool::new(
            "clear_selected_elements",
            "Clear the list of selected HTML elements",
            no_arguments(),
        )
    }

    fn get_connection_status_tool() -> Tool {
        Tool::new(
            "get_connection_status",
            "Report whether the browser extension is connected and where screenshots are saved",
            no_arguments(),
        )
    }
}

fn no_arguments() -> Arc<JsonObject> {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), Value::String("object".to_string()));
    schema.insert("properties".to_string(), json!({}));
    Arc::new(schema)
}

pub fn success_response(message: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(message)])
}

pub fn error_response(message: String) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message)])
}
