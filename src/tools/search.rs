//! Canned web search
//!
//! The same stub answers under several names so prompts written for either
//! the `searchWeb` or the `brave_search` function work unchanged.

use crate::core::{Tool, ToolArgs, ToolError, ToolResult};
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

pub struct SearchWebTool {
    name: String,
    answer: String,
}

impl SearchWebTool {
    /// Search stub registered as `name` that always returns `answer`
    pub fn new(name: &str, answer: &str) -> Self {
        Self {
            name: name.to_string(),
            answer: answer.to_string(),
        }
    }
}

impl Tool for SearchWebTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information about a query"
    }

    fn validate_args(&self, args: &ToolArgs) -> Result<(), ToolError> {
        let params: SearchParams = args.deserialize()?;
        if params.query.trim().is_empty() {
            return Err(ToolError::InvalidArgs {
                message: "query must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn execute(&self, args: &ToolArgs) -> Result<ToolResult> {
        let params: SearchParams = args.deserialize()?;
        tracing::info!(tool = %self.name, query = %params.query, "Searching the web");

        Ok(ToolResult::success_with_data(
            self.answer.clone(),
            serde_json::json!({ "result": self.answer }),
        ))
    }

    fn get_parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_returns_structured_answer() {
        let tool = SearchWebTool::new("searchWeb", "Avogadro's number is 6.022 x 10^23");
        let args = ToolArgs::parse(r#"{"query": "avogadro's number"}"#).unwrap();

        let result = tool.execute(&args).unwrap();
        assert!(result.success);
        assert_eq!(
            result.to_content(),
            r#"{"result":"Avogadro's number is 6.022 x 10^23"}"#
        );
    }

    #[test]
    fn test_search_requires_query() {
        let tool = SearchWebTool::new("brave_search", "anything");
        assert_eq!(tool.name(), "brave_search");

        assert!(tool.validate_args(&ToolArgs::default()).is_err());
        let blank = ToolArgs::parse(r#"{"query": ""}"#).unwrap();
        assert!(tool.validate_args(&blank).is_err());
    }
}
