//! Wire format of the extension socket.
//!
//! Every frame is a JSON text frame tagged by `type`. Field names are camelCase.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent by the browser extension.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum InboundMessage {
    ConsoleLogData {
        #[serde(default)]
        data: Value,
    },
    #[serde(rename_all = "camelCase")]
    ScreenshotData {
        #[serde(default)]
        request_id: Option<String>,
        data: String,
        #[serde(default, alias = "savePath")]
        path: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    ScreenshotError {
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    SelectedElement {
        data: ElementRecord,
    },
    UpdateSavePath {
        path: String,
    },
}

impl InboundMessage {
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConsoleLogData { .. } => "console-log-data",
            Self::ScreenshotData { .. } => "screenshot-data",
            Self::ScreenshotError { .. } => "screenshot-error",
            Self::SelectedElement { .. } => "selected-element",
            Self::UpdateSavePath { .. } => "update-save-path",
        }
    }
}

/// Frames sent to the browser extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutboundMessage {
    #[serde(rename_all = "camelCase")]
    TakeScreenshot { request_id: String },
    PathUpdateConfirmation { success: bool },
}

impl OutboundMessage {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAttribute {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

/// An element picked with the extension's element selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attributes: Vec<ElementAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_screenshot_data_with_request_id() {
        let msg = InboundMessage::parse(
            r#"{"type":"screenshot-data","requestId":"r1","data":"Zm9v","path":"/tmp/a.png"}"#,
        )
        .unwrap();

        assert_eq!(
            msg,
            InboundMessage::ScreenshotData {
                request_id: Some("r1".to_string()),
                data: "Zm9v".to_string(),
                path: Some("/tmp/a.png".to_string()),
            }
        );
    }

    #[test]
    fn test_save_path_alias() {
        let msg =
            InboundMessage::parse(r#"{"type":"screenshot-data","data":"Zm9v","savePath":"/tmp/shots"}"#)
                .unwrap();
        match msg {
            InboundMessage::ScreenshotData { request_id, path, .. } => {
                assert!(request_id.is_none());
                assert_eq!(path.as_deref(), Some("/tmp/shots"));
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_selected_element_defaults_missing_fields() {
        let msg = InboundMessage::parse(
            r#"{"type":"selected-element","data":{"tag":"button","classes":["primary"]}}"#,
        )
        .unwrap();
        match msg {
            InboundMessage::SelectedElement { data } => {
                assert_eq!(data.tag, "button");
                assert_eq!(data.classes, vec!["primary".to_string()]);
                assert!(data.id.is_empty());
                assert!(data.attributes.is_empty());
                assert!(data.instruction.is_none());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_frames_are_rejected() {
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"type":"reload-page"}"#).is_err());
        assert!(InboundMessage::parse(r#"{"type":"screenshot-data"}"#).is_err());
        assert!(InboundMessage::parse(r#"{"type":"update-save-path"}"#).is_err());
    }

    #[test]
    fn test_outbound_frames() {
        let take = OutboundMessage::TakeScreenshot {
            request_id: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&take).unwrap(),
            serde_json::json!({"type": "take-screenshot", "requestId": "abc"})
        );

        let ack = OutboundMessage::PathUpdateConfirmation { success: true };
        assert_eq!(
            ack.to_json().unwrap(),
            r#"{"type":"path-update-confirmation","success":true}"#
        );
    }
}
