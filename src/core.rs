//! Core traits and types for the tool dispatch surface

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::llm::ToolDefinition;

/// Largest edit distance still offered as a "did you mean" suggestion
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Error types for tool operations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },
    #[error("Tool not found: {name}{}", suggestion_hint(.suggestion))]
    ToolNotFound {
        name: String,
        suggestion: Option<String>,
    },
    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

/// Arguments passed to tool execution, parsed from the model's JSON payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolArgs {
    pub values: Map<String, Value>,
}

impl ToolArgs {
    /// Parse the serialized argument text a model attached to a tool call.
    ///
    /// Blank payloads are accepted as an empty object since some endpoints
    /// send `""` for parameterless functions.
    pub fn parse(arguments: &str) -> Result<Self, ToolError> {
        if arguments.trim().is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArgs {
            message: format!("arguments are not valid JSON: {}", e),
        })?;

        Self::from_value(value)
    }

    /// Wrap an already-decoded JSON value; only objects (or null) are accepted
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::InvalidArgs {
                message: format!("arguments must be a JSON object, got {}", json_kind(&other)),
            }),
        }
    }

    /// Deserialize the arguments into the tool's typed parameter struct
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.values.clone())).map_err(|e| {
            ToolError::InvalidArgs {
                message: e.to_string(),
            }
        })
    }

    /// Get a string argument by name
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_str())
    }

    /// Get argument count
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if arguments are empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Result returned by tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
}

impl ToolResult {
    /// Create successful result
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    /// Create successful result with data
    pub fn success_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    /// Text placed in the tool-result message sent back to the model.
    ///
    /// Structured data wins over the human message so the model sees the
    /// same JSON a handler produced.
    pub fn to_content(&self) -> String {
        match &self.data {
            Some(Value::String(text)) => text.clone(),
            Some(data) => data.to_string(),
            None => self.message.clone(),
        }
    }
}

/// Main trait for all tools
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Validate arguments before execution
    fn validate_args(&self, _args: &ToolArgs) -> Result<(), ToolError> {
        Ok(())
    }

    /// Execute the tool with given arguments
    fn execute(&self, args: &ToolArgs) -> Result<ToolResult>;

    /// Get parameters schema - should be overridden by implementing tools
    fn get_parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// Descriptor sent to the model in the request's `tools` array
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            self.name(),
            self.description(),
            self.get_parameters_schema(),
        )
    }

    /// Get OpenAI function schema for this tool
    fn get_openai_schema(&self) -> Value {
        serde_json::to_value(self.definition()).unwrap_or(Value::Null)
    }
}

/// Registry for managing available tools
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool already registered under its name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::ToolNotFound {
            name: name.to_string(),
            suggestion: self.closest_name(name),
        })?;

        tool.validate_args(args)?;

        tool.execute(args).map_err(|e| ToolError::ExecutionFailed {
            message: e.to_string(),
        })
    }

    /// Check whether a tool is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all registered tool names, sorted
    pub fn list_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get tool by name
    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get OpenAI function schemas for all tools
    pub fn get_all_schemas(&self) -> Vec<Value> {
        self.definitions()
            .into_iter()
            .filter_map(|definition| serde_json::to_value(definition).ok())
            .collect()
    }

    /// Tool descriptors in name order, as sent with every request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools()
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Closest registered name, for "did you mean" hints on unknown tools
    pub fn closest_name(&self, name: &str) -> Option<String> {
        self.tools
            .keys()
            .map(|candidate| {
                let distance = edit_distance::edit_distance(
                    &name.to_lowercase(),
                    &candidate.to_lowercase(),
                );
                (distance, candidate)
            })
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
            .map(|(_, candidate)| candidate.clone())
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if no tools are registered
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
