//! Result shapes handed back to callers, and the single place failures are
//! turned into text.

use crate::backend::ApiError;
use rmcp::model::{CallToolResult, Content, ReadResourceResult, ResourceContents};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextContent {
    Text { text: String },
}

impl TextContent {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } => text,
        }
    }
}

/// Outcome of one tool call. `is_error` is only serialized when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub content: Vec<TextContent>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ResultEnvelope {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// Text of the first content entry.
    pub fn text(&self) -> &str {
        self.content.first().map(TextContent::text).unwrap_or_default()
    }
}

impl From<ResultEnvelope> for CallToolResult {
    fn from(envelope: ResultEnvelope) -> Self {
        let content = envelope
            .content
            .into_iter()
            .map(|entry| match entry {
                TextContent::Text { text } => Content::text(text),
            })
            .collect();
        CallToolResult {
            content,
            structured_content: None,
            is_error: Some(envelope.is_error),
            meta: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceText {
    pub uri: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEnvelope {
    pub contents: Vec<ResourceText>,
}

impl ResourceEnvelope {
    pub fn text(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            contents: vec![ResourceText {
                uri: uri.into(),
                text: text.into(),
                is_error: false,
            }],
        }
    }

    pub fn error(uri: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            contents: vec![ResourceText {
                uri: uri.into(),
                text: text.into(),
                is_error: true,
            }],
        }
    }

    pub fn is_error(&self) -> bool {
        self.contents.iter().any(|entry| entry.is_error)
    }
}

// MCP resource contents have no error flag; the text carries the failure.
impl From<ResourceEnvelope> for ReadResourceResult {
    fn from(envelope: ResourceEnvelope) -> Self {
        ReadResourceResult {
            contents: envelope
                .contents
                .into_iter()
                .map(|entry| ResourceContents::text(entry.text, entry.uri))
                .collect(),
        }
    }
}

/// Formats a handler failure for the caller. Plain failures print their whole
/// context chain so the underlying cause survives.
pub fn error_text(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ApiError>() {
        Some(api) => format!(
            "API Error ({} {}): {}",
            api.status,
            api.status_text,
            api.message()
        ),
        None => format!("Error: {error:#}"),
    }
}

/// Logs the failure, then wraps [`error_text`] in an error envelope.
pub fn normalize_error(tool: &str, error: anyhow::Error) -> ResultEnvelope {
    tracing::error!(tool = tool, error = ?error, "tool call failed");
    ResultEnvelope::error(error_text(&error))
}
