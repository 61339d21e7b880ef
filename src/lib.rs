//! # turnloop - tool-calling conversation driver
//!
//! Drives a multi-turn exchange with an OpenAI-compatible chat-completions
//! endpoint. The model may answer directly or ask for local tools to be run;
//! tool results are fed back until it produces a final answer.
//!
//! ## Features
//!
//! - **Tool Registry**: Named tools with JSON-schema parameter descriptors
//! - **Driver**: Request/dispatch loop with a turn limit and an unknown-tool policy
//! - **Clients**: reqwest-based OpenAI-compatible client plus a scripted mock
//! - **Built-in Tools**: Weather and search stubs and an arithmetic calculator
//!
//! ## Usage
//!
//! ```rust,no_run
//! use turnloop::{create_tool_registry, Config, Conversation, Driver, OpenAiClient};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load(None)?;
//! let client = OpenAiClient::new(&config.client, config.client.api_key()?)?;
//! let driver = Driver::new(client, create_tool_registry(), &config);
//!
//! let mut conversation = Conversation::with_prompt(None, "What's the weather like in Boston today?");
//! let exchange = driver.run(&mut conversation).await?;
//! println!("{}", exchange.answer);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod core;
pub mod driver;
pub mod llm;
pub mod tools;
pub mod utils;

// Re-export main types
pub use config::{Config, ConfigError, DriverConfig, UnknownToolPolicy};
pub use conversation::Conversation;
pub use core::{Tool, ToolArgs, ToolError, ToolRegistry, ToolResult};
pub use driver::{Diagnostic, Driver, DriverError, Exchange, Turn, TurnOutcome};
pub use llm::{ChatClient, ChatMessage, ClientError, MockChatClient, OpenAiClient, ToolCall};
pub use tools::{CalculatorTool, GetCurrentWeatherTool, SearchWebTool};

/// Initialize the tool registry with all built-in tools
pub fn create_tool_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Box::new(GetCurrentWeatherTool::new()));

    // Two names for the same canned search
    registry.register(Box::new(SearchWebTool::new(
        "searchWeb",
        tools::SEARCH_WEB_ANSWER,
    )));
    registry.register(Box::new(SearchWebTool::new(
        "brave_search",
        tools::BRAVE_SEARCH_ANSWER,
    )));

    registry.register(Box::new(CalculatorTool::new()));

    registry
}
