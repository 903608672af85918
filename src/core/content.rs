//! Output blocks as they travel back to the calling agent.

use rmcp::model::{CallToolResult, Content};
use serde::{Deserialize, Serialize};

/// One unit of a tool response, serialized in the MCP content shape:
/// `{"type":"text","text":..}` or `{"type":"resource","resource":{..}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutputBlock {
    Text { text: String },
    Resource { resource: ResourceRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub uri: String,
    pub text: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl OutputBlock {
    pub fn text(text: impl Into<String>) -> Self {
        OutputBlock::Text { text: text.into() }
    }

    pub fn resource(uri: impl Into<String>, text: impl Into<String>, mime_type: Option<String>) -> Self {
        OutputBlock::Resource {
            resource: ResourceRef {
                uri: uri.into(),
                text: text.into(),
                mime_type,
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputBlock::Text { text } => Some(text),
            OutputBlock::Resource { .. } => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceRef> {
        match self {
            OutputBlock::Resource { resource } => Some(resource),
            OutputBlock::Text { .. } => None,
        }
    }

    /// Convert into the rmcp content type through its JSON shape, so the
    /// block layout stays independent of rmcp's struct fields.
    pub fn to_content(&self) -> Result<Content, serde_json::Error> {
        serde_json::to_value(self).and_then(serde_json::from_value)
    }
}

/// The complete result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolOutput {
    pub content: Vec<OutputBlock>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(content: Vec<OutputBlock>) -> Self {
        Self { content, is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![OutputBlock::text(message)],
            is_error: true,
        }
    }

    pub fn into_call_result(self) -> Result<CallToolResult, serde_json::Error> {
        let content = self
            .content
            .iter()
            .map(OutputBlock::to_content)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        })
    }
}
