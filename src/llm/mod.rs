//! Chat-completions integration
//!
//! Message and request types for OpenAI-compatible endpoints, the
//! [`ChatClient`] seam with an HTTP implementation and a scripted mock, and
//! dispatch of model-requested tool calls to the registry.
//!
//! ## Features
//!
//! - **Wire types**: messages, tool calls and descriptors in the chat-completions shape
//! - **Clients**: [`OpenAiClient`] over reqwest, [`MockChatClient`] for tests
//! - **Tool Execution**: Execute tool calls with logging and per-call error results
//! - **Result Handling**: Truncate oversized tool results before they reach the model

mod client;
pub mod error;
pub mod executor;
pub mod mock;
pub mod openai;
pub mod result_handler;
mod types;

pub use client::ChatClient;
pub use error::ClientError;
pub use executor::{
    execute_tool_call, execute_tool_calls, ExecutionCallback, ExecutionOutcome, NoOpCallback,
    ToolExecutionResult,
};
pub use mock::MockChatClient;
pub use openai::OpenAiClient;
pub use result_handler::{handle_large_result, ResultHandlerConfig};
pub use types::{
    AssistantReply, ChatMessage, ChatRequest, ChatResponse, FunctionCall, FunctionDefinition,
    MessageRole, ToolCall, ToolChoice, ToolDefinition, Usage,
};
