//! Scripted chat client for tests and offline runs

use super::client::ChatClient;
use super::error::ClientError;
use super::types::{AssistantReply, ChatRequest, ChatResponse, ToolCall};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Plays back queued responses in order and records every request it sees
pub struct MockChatClient {
    responses: Mutex<VecDeque<Result<ChatResponse, ClientError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    name: String,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::with_name("MockChat")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    /// Queue a plain text answer
    pub fn push_text(&self, content: impl Into<String>) -> &Self {
        self.push_response(ChatResponse::new(AssistantReply::text(content)))
    }

    /// Queue a reply requesting tool calls with `null` content, the way the
    /// hosted endpoints send it
    pub fn push_tool_calls(&self, tool_calls: Vec<ToolCall>) -> &Self {
        self.push_response(ChatResponse::new(AssistantReply::with_tool_calls(
            None, tool_calls,
        )))
    }

    pub fn push_response(&self, response: ChatResponse) -> &Self {
        self.lock_responses().push_back(Ok(response));
        self
    }

    pub fn push_error(&self, error: ClientError) -> &Self {
        self.lock_responses().push_back(Err(error));
        self
    }

    pub fn remaining_responses(&self) -> usize {
        self.lock_responses().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn lock_responses(
        &self,
    ) -> std::sync::MutexGuard<'_, VecDeque<Result<ChatResponse, ClientError>>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        let next = self.lock_responses().pop_front();
        next.unwrap_or_else(|| {
            Err(ClientError::InvalidResponse {
                message: format!("{}: no scripted response left", self.name),
            })
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
