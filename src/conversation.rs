//! Append-only message history for one exchange

use serde::Serialize;

use crate::llm::{ChatMessage, MessageRole, ToolCall};

/// Ordered message sequence; existing messages are never modified
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a user prompt, optionally preceded by a system prompt
    pub fn with_prompt(system: Option<&str>, user: &str) -> Self {
        let mut conversation = Self::new();
        if let Some(system) = system {
            conversation.push(ChatMessage::system(system));
        }
        conversation.push(ChatMessage::user(user));
        conversation
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// The most recent user message, i.e. the question being answered
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
    }

    /// Tool calls from the latest assistant message that have no result yet
    pub fn unanswered_tool_calls(&self) -> Vec<&ToolCall> {
        let Some(index) = self
            .messages
            .iter()
            .rposition(|m| m.role == MessageRole::Assistant)
        else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.messages[index + 1..]
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        self.messages[index]
            .requested_tool_calls()
            .iter()
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

impl From<Vec<ChatMessage>> for Conversation {
    fn from(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_prompt() {
        let conversation = Conversation::with_prompt(Some("You are a helpful assistant."), "hi");
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, MessageRole::System);
        assert_eq!(conversation.last_user_message().unwrap().content, "hi");

        let bare = Conversation::with_prompt(None, "hi");
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn test_last_user_message_skips_tool_traffic() {
        let mut conversation = Conversation::with_prompt(None, "Weather in Boston?");
        conversation.push(ChatMessage::assistant_with_tools(
            "",
            vec![ToolCall::new("call_1", "getCurrentWeather", "{}")],
        ));
        conversation.push(ChatMessage::tool_result("call_1", "sunny"));

        assert_eq!(
            conversation.last_user_message().unwrap().content,
            "Weather in Boston?"
        );
    }

    #[test]
    fn test_unanswered_tool_calls() {
        let mut conversation = Conversation::with_prompt(None, "q");
        assert!(conversation.unanswered_tool_calls().is_empty());

        conversation.push(ChatMessage::assistant_with_tools(
            "",
            vec![
                ToolCall::new("call_1", "searchWeb", "{}"),
                ToolCall::new("call_2", "calculator", "{}"),
            ],
        ));
        assert_eq!(conversation.unanswered_tool_calls().len(), 2);

        conversation.push(ChatMessage::tool_result("call_1", "done"));
        let pending = conversation.unanswered_tool_calls();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "call_2");

        conversation.push(ChatMessage::tool_result("call_2", "done"));
        assert!(conversation.unanswered_tool_calls().is_empty());
    }

    #[test]
    fn test_serializes_as_message_array() {
        let conversation = Conversation::with_prompt(None, "hi");
        let value = serde_json::to_value(&conversation).unwrap();
        assert_eq!(value, serde_json::json!([{"role": "user", "content": "hi"}]));
    }
}
