//! Event model for the correction service's streaming output
//!
//! The `claude` CLI in `stream-json` mode writes one JSON object per line.
//! Only the shapes the fixer cares about are modelled; everything else
//! decodes to an `Unknown` variant and is ignored.

use serde::Deserialize;
use serde_json::Value;

/// Name of the edit tool the service is allowed to use
pub const EDIT_TOOL: &str = "Edit";

/// Result subtype reported when the service stops at its turn limit
pub const MAX_TURNS_SUBTYPE: &str = "error_max_turns";

/// One event from the service stream
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceEvent {
    /// Session metadata (model, tools, working directory)
    System {
        #[serde(default)]
        subtype: Option<String>,
    },
    /// A message produced by the assistant
    Assistant { message: Message },
    /// A message fed back to the assistant, usually tool results
    User { message: Message },
    /// Final summary of the exchange
    Result {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        num_turns: Option<u32>,
    },
    #[serde(other)]
    Unknown,
}

impl ServiceEvent {
    /// An assistant message made of the given blocks
    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        ServiceEvent::Assistant {
            message: Message::from_blocks(blocks),
        }
    }

    /// A user message made of the given blocks
    pub fn user(blocks: Vec<ContentBlock>) -> Self {
        ServiceEvent::User {
            message: Message::from_blocks(blocks),
        }
    }

    /// Content blocks carried by this event, if it is a message
    pub fn blocks(&self) -> &[ContentBlock] {
        match self {
            ServiceEvent::Assistant { message } | ServiceEvent::User { message } => {
                message.blocks()
            }
            _ => &[],
        }
    }

    /// Whether this is the final summary event
    pub fn is_result(&self) -> bool {
        matches!(self, ServiceEvent::Result { .. })
    }
}

/// A chat message
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub content: MessageContent,
}

impl Message {
    /// Create a message from content blocks
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self {
            content: MessageContent::Blocks(blocks),
        }
    }

    /// Content blocks of this message; plain text messages have none
    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            MessageContent::Blocks(blocks) => blocks,
            MessageContent::Text(_) => &[],
        }
    }
}

/// Message content is either a bare string or a list of blocks
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Blocks(Vec::new())
    }
}

/// A single content block inside a message
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    /// The assistant invoking a tool
    ToolUse {
        #[serde(default)]
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    /// The outcome of a tool invocation
    ToolResult {
        #[serde(default)]
        tool_use_id: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// Build an `Edit` tool invocation
    pub fn edit(id: &str, file_path: &str, old_string: &str, new_string: &str) -> Self {
        ContentBlock::ToolUse {
            id: id.to_string(),
            name: EDIT_TOOL.to_string(),
            input: serde_json::json!({
                "file_path": file_path,
                "old_string": old_string,
                "new_string": new_string,
            }),
        }
    }

    /// Build a tool result
    pub fn tool_result(tool_use_id: &str, is_error: bool, content: &str) -> Self {
        ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: Value::String(content.to_string()),
            is_error: Some(is_error),
        }
    }
}

/// Render tool result content for diagnostics
pub fn content_text(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item.get("text").and_then(Value::as_str) {
                Some(text) => text.to_string(),
                None => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
