//! Conversation driver
//!
//! Sends the conversation plus tool descriptors to the model, dispatches any
//! requested tool calls to the registry, appends their results and repeats
//! until the model answers without requesting tools.
//!
//! Every tool call receives exactly one tool-result message before the next
//! request, except under [`UnknownToolPolicy::Skip`], which leaves calls to
//! unregistered tools unanswered.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, DriverConfig, SamplingConfig, UnknownToolPolicy};
use crate::conversation::Conversation;
use crate::core::ToolRegistry;
use crate::llm::executor::{
    execute_tool_calls, ExecutionCallback, ExecutionOutcome, NoOpCallback, ToolExecutionResult,
};
use crate::llm::{ChatClient, ChatMessage, ChatRequest, ClientError, Usage};
use crate::utils::estimate_prompt_tokens;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("model was still requesting tools after {max_turns} turns")]
    TurnLimit { max_turns: usize },
    #[error("conversation has no messages to send")]
    EmptyConversation,
}

/// A tool call that did not complete normally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub tool_call_id: String,
    pub tool_name: String,
    pub outcome: ExecutionOutcome,
    pub message: String,
    /// Whether a tool-result message was still appended for this call
    pub result_appended: bool,
}

/// What a single turn produced
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The model answered without requesting tools
    Answer(String),
    /// Tools were executed; another turn is needed
    ToolsDispatched { results: Vec<ToolExecutionResult> },
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub outcome: TurnOutcome,
    pub usage: Option<Usage>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of a completed exchange
#[derive(Debug, Clone)]
pub struct Exchange {
    pub answer: String,
    /// Number of model requests made
    pub turns: usize,
    /// Number of tool calls the model requested across all turns
    pub tool_calls: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub usage: Usage,
}

pub struct Driver<C: ChatClient> {
    client: C,
    registry: ToolRegistry,
    model: String,
    sampling: SamplingConfig,
    config: DriverConfig,
}

impl<C: ChatClient> Driver<C> {
    pub fn new(client: C, registry: ToolRegistry, config: &Config) -> Self {
        Self {
            client,
            registry,
            model: config.client.model.clone(),
            sampling: config.sampling.clone(),
            config: config.driver.clone(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn build_request(&self, conversation: &Conversation) -> ChatRequest {
        ChatRequest::new(&self.model, conversation.messages().to_vec())
            .with_tools(self.registry.definitions(), self.sampling.tool_choice)
            .with_temperature(self.sampling.temperature)
            .with_max_tokens(self.sampling.max_tokens)
            .with_top_p(self.sampling.top_p)
            .with_presence_penalty(self.sampling.presence_penalty)
    }

    fn diagnose(&self, result: &ToolExecutionResult, result_appended: bool) -> Diagnostic {
        let message = match result.outcome {
            ExecutionOutcome::UnknownTool => match self.registry.closest_name(&result.tool_name) {
                Some(suggestion) => format!(
                    "model requested unknown tool '{}' (did you mean '{}'?)",
                    result.tool_name, suggestion
                ),
                None => format!("model requested unknown tool '{}'", result.tool_name),
            },
            _ => result.content.clone(),
        };

        Diagnostic {
            tool_call_id: result.tool_call_id.clone(),
            tool_name: result.tool_name.clone(),
            outcome: result.outcome,
            message,
            result_appended,
        }
    }

    /// Perform one request/response exchange and dispatch any tool calls.
    ///
    /// The assistant message (null content normalized to `""`) and the tool
    /// results are appended to `conversation`; nothing already in it changes.
    pub async fn turn(
        &self,
        conversation: &mut Conversation,
        callback: &mut dyn ExecutionCallback,
    ) -> Result<Turn, DriverError> {
        if conversation.is_empty() {
            return Err(DriverError::EmptyConversation);
        }

        let unanswered = conversation.unanswered_tool_calls().len();
        if unanswered > 0 {
            warn!(
                unanswered,
                "Sending conversation with unanswered tool calls; the endpoint may reject it"
            );
        }

        debug!(
            estimated_prompt_tokens = estimate_prompt_tokens(conversation.messages()),
            "Prompt size estimate"
        );

        let request = self.build_request(conversation);
        let response = self.client.chat(&request).await?;

        let message = response.message.normalize();
        let tool_calls = message.requested_tool_calls().to_vec();
        let content = message.content.clone();
        conversation.push(message);

        if tool_calls.is_empty() {
            return Ok(Turn {
                outcome: TurnOutcome::Answer(content),
                usage: response.usage,
                diagnostics: Vec::new(),
            });
        }

        info!(count = tool_calls.len(), "Model requested tool calls");
        let results = execute_tool_calls(
            &self.registry,
            &tool_calls,
            &self.config.result_handler(),
            callback,
        );

        let mut diagnostics = Vec::new();
        for result in &results {
            let skip = result.outcome == ExecutionOutcome::UnknownTool
                && self.config.unknown_tool == UnknownToolPolicy::Skip;

            if result.outcome != ExecutionOutcome::Success {
                let diagnostic = self.diagnose(result, !skip);
                warn!(
                    call_id = %diagnostic.tool_call_id,
                    outcome = ?diagnostic.outcome,
                    "{}",
                    diagnostic.message
                );
                diagnostics.push(diagnostic);
            }

            if !skip {
                conversation.push(ChatMessage::tool_result(
                    result.tool_call_id.clone(),
                    result.content.clone(),
                ));
            }
        }

        Ok(Turn {
            outcome: TurnOutcome::ToolsDispatched { results },
            usage: response.usage,
            diagnostics,
        })
    }

    /// Run turns until the model answers without tool calls
    pub async fn run(&self, conversation: &mut Conversation) -> Result<Exchange, DriverError> {
        self.run_with_callback(conversation, &mut NoOpCallback).await
    }

    pub async fn run_with_callback(
        &self,
        conversation: &mut Conversation,
        callback: &mut dyn ExecutionCallback,
    ) -> Result<Exchange, DriverError> {
        if let Some(question) = conversation.last_user_message() {
            info!(model = %self.model, question = %question.content, "Starting exchange");
        }

        let mut usage = Usage::default();
        let mut diagnostics = Vec::new();
        let mut tool_calls = 0;

        for turn_number in 1..=self.config.max_turns {
            info!(
                turn = turn_number,
                model = %self.model,
                client = self.client.name(),
                messages = conversation.len(),
                "Requesting completion"
            );

            let turn = self.turn(conversation, callback).await?;
            if let Some(turn_usage) = &turn.usage {
                usage.accumulate(turn_usage);
            }
            diagnostics.extend(turn.diagnostics);

            match turn.outcome {
                TurnOutcome::Answer(answer) => {
                    info!(
                        turns = turn_number,
                        tool_calls,
                        total_tokens = usage.total_tokens,
                        "Exchange complete"
                    );
                    return Ok(Exchange {
                        answer,
                        turns: turn_number,
                        tool_calls,
                        diagnostics,
                        usage,
                    });
                }
                TurnOutcome::ToolsDispatched { results } => tool_calls += results.len(),
            }
        }

        Err(DriverError::TurnLimit {
            max_turns: self.config.max_turns,
        })
    }
}
