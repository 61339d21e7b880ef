//! Tool execution for model-requested function calls
//!
//! Turns each [`ToolCall`] into one [`ToolExecutionResult`], in order, with
//! argument parsing, dispatch and size limiting handled here. Failures never
//! abort the batch: they become a result whose content describes the error.

use crate::core::{ToolArgs, ToolError, ToolRegistry};
use tracing::{debug, warn};

use super::result_handler::{handle_large_result, ResultHandlerConfig};
use super::types::ToolCall;

/// How a single tool call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    /// The tool ran but reported failure or returned an error
    Failed,
    /// The argument payload was malformed or did not match the tool's schema
    InvalidArguments,
    /// No tool is registered under the requested name
    UnknownTool,
}

/// Result from a single tool execution
#[derive(Debug, Clone)]
pub struct ToolExecutionResult {
    /// Tool call ID (for provider correlation)
    pub tool_call_id: String,
    pub tool_name: String,
    /// Result content or error message
    pub content: String,
    pub outcome: ExecutionOutcome,
}

impl ToolExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.outcome == ExecutionOutcome::Success
    }
}

/// Optional callback for progress reporting
pub trait ExecutionCallback {
    /// Called before executing a tool
    fn on_tool_start(&mut self, call: &ToolCall);

    /// Called after tool execution (success or failure)
    fn on_tool_complete(&mut self, result: &ToolExecutionResult);
}

/// Default no-op callback
pub struct NoOpCallback;

impl ExecutionCallback for NoOpCallback {
    fn on_tool_start(&mut self, _call: &ToolCall) {}
    fn on_tool_complete(&mut self, _result: &ToolExecutionResult) {}
}

/// Execute one tool call against the registry
pub fn execute_tool_call(
    registry: &ToolRegistry,
    call: &ToolCall,
    result_config: &ResultHandlerConfig,
) -> ToolExecutionResult {
    let tool_name = call.name();
    let finish = |content: String, outcome: ExecutionOutcome| ToolExecutionResult {
        tool_call_id: call.id.clone(),
        tool_name: tool_name.to_string(),
        content,
        outcome,
    };

    let args = match ToolArgs::parse(call.arguments()) {
        Ok(args) => args,
        Err(e) => {
            warn!(tool = tool_name, call_id = %call.id, "Malformed tool arguments: {}", e);
            return finish(
                format!("Failed to parse arguments for {}: {}", tool_name, e),
                ExecutionOutcome::InvalidArguments,
            );
        }
    };

    match registry.execute_tool(tool_name, &args) {
        Ok(result) => {
            let content = handle_large_result(tool_name, &result.to_content(), result_config);
            let outcome = if result.success {
                ExecutionOutcome::Success
            } else {
                ExecutionOutcome::Failed
            };
            debug!(tool = tool_name, call_id = %call.id, ?outcome, "Tool finished");
            finish(content, outcome)
        }
        Err(e @ ToolError::ToolNotFound { .. }) => {
            warn!(call_id = %call.id, "{}", e);
            finish(
                format!("No handler for tool {}", tool_name),
                ExecutionOutcome::UnknownTool,
            )
        }
        Err(e @ ToolError::InvalidArgs { .. }) => {
            warn!(tool = tool_name, call_id = %call.id, "{}", e);
            finish(
                format!("Invalid arguments for {}: {}", tool_name, e),
                ExecutionOutcome::InvalidArguments,
            )
        }
        Err(e) => {
            warn!(tool = tool_name, call_id = %call.id, "{}", e);
            finish(
                format!("Tool execution failed for {}: {}", tool_name, e),
                ExecutionOutcome::Failed,
            )
        }
    }
}

/// Execute tool calls in the order received and return one result per call
pub fn execute_tool_calls(
    registry: &ToolRegistry,
    tool_calls: &[ToolCall],
    result_config: &ResultHandlerConfig,
    callback: &mut dyn ExecutionCallback,
) -> Vec<ToolExecutionResult> {
    tool_calls
        .iter()
        .map(|call| {
            callback.on_tool_start(call);
            let result = execute_tool_call(registry, call, result_config);
            callback.on_tool_complete(&result);
            result
        })
        .collect()
}
