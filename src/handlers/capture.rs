//! Screenshot capture and connection status handlers

use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::{
    bridge::Bridge,
    tools::{error_response, success_response},
};

/// Capture the active tab through the extension and save it
pub async fn handle_capture_screenshot(bridge: &Bridge) -> Result<CallToolResult, McpError> {
    match bridge.capture_screenshot().await {
        Ok(saved) => Ok(success_response(format!(
            "Screenshot captured successfully!\nPath: {}\nFilename: {}",
            saved.path.display(),
            saved.filename
        ))),
        Err(e) => {
            tracing::error!("Screenshot capture error: {}", e);
            Ok(error_response(format!("Error capturing screenshot: {e}")))
        }
    }
}

pub async fn handle_get_connection_status(bridge: &Bridge) -> Result<CallToolResult, McpError> {
    let connection = match bridge.peers().current() {
        Some(peer) => format!("connected (connection {})", peer.id()),
        None => "not connected".to_string(),
    };

    Ok(success_response(format!(
        "Browser extension: {connection}\nPending captures: {}\nScreenshot path: {}",
        bridge.pending().len(),
        bridge.artifacts().destination().display()
    )))
}
