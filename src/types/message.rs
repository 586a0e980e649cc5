//! Conversation types shared between the orchestrator and the model API.

use serde::{Deserialize, Serialize};

/// A message in a conversation.
///
/// The history is an append-only ordered sequence of these; nothing is
/// mutated in place after being appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Create an assistant message from model response content.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create a user message carrying a single tool result, correlated to
    /// the tool use block that triggered it.
    pub fn tool_result(
        tool_use_id: impl Into<String>,
        content: serde_json::Value,
        is_error: bool,
    ) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content,
                is_error,
            }],
        }
    }

    /// Extract the text content, concatenating all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Count the tool use blocks in this message.
    pub fn tool_use_count(&self) -> usize {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
            .count()
    }

    /// Count the tool result blocks in this message.
    pub fn tool_result_count(&self) -> usize {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolResult { .. }))
            .count()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single block of message content.
///
/// Serializes to the exact shape the model API expects, so a `Message` can
/// go straight into a request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: serde_json::Value,
        #[serde(default)]
        is_error: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_message_has_single_text_block() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text(), "hello");
    }

    #[test]
    fn content_blocks_serialize_with_type_tags() {
        let block = ContentBlock::ToolUse {
            id: "toolu_1".into(),
            name: "create_object".into(),
            input: json!({"type": "box"}),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["type"], "tool_use");
        assert_eq!(value["name"], "create_object");
        assert_eq!(value["input"]["type"], "box");
    }

    #[test]
    fn tool_result_round_trips() {
        let msg = Message::tool_result("toolu_1", json!([{"type": "text", "text": "ok"}]), false);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert_eq!(value["content"][0]["tool_use_id"], "toolu_1");

        let back: Message = serde_json::from_value(value).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn block_counts() {
        let msg = Message::assistant(vec![
            ContentBlock::Text { text: "a".into() },
            ContentBlock::ToolUse {
                id: "1".into(),
                name: "t".into(),
                input: json!({}),
            },
        ]);
        assert_eq!(msg.tool_use_count(), 1);
        assert_eq!(msg.tool_result_count(), 0);
    }
}
