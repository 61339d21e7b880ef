//! OpenAI-compatible HTTP chat completion client
//!
//! Speaks the `POST {base_url}/chat/completions` dialect shared by OpenAI and
//! the hosted Llama endpoints the demo scripts target. One request per call,
//! no retries: failures are mapped onto [`ClientError`] and returned.

use super::client::ChatClient;
use super::error::ClientError;
use super::types::{AssistantReply, ChatRequest, ChatResponse, Usage};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantReply,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for OpenAI-compatible chat completion endpoints
pub struct OpenAiClient {
    endpoint: String,
    api_key: String,
    timeout: Duration,
    http_client: Client,
}

impl OpenAiClient {
    /// Build a client from configuration and an already-resolved API key
    pub fn new(config: &ClientConfig, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            timeout,
            http_client,
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            ClientError::Transport {
                message: error.to_string(),
            }
        }
    }
}

/// Map a non-success status and its body text onto an error variant
fn status_error(status: StatusCode, headers: &HeaderMap, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::Authentication { message }
        }
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimited {
            retry_after: headers
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        },
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let start = Instant::now();
        debug!(
            endpoint = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            return Err(status_error(status, &headers, &body));
        }

        let parsed: CompletionBody =
            serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse {
                message: format!("failed to decode completion: {}", e),
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidResponse {
                message: "completion contained no choices".to_string(),
            })?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "Chat completion received"
        );
        if let Some(usage) = &parsed.usage {
            debug!(?usage, "Token usage");
        }

        Ok(ChatResponse {
            message: choice.message,
            finish_reason: choice.finish_reason,
            usage: parsed.usage,
        })
    }

    fn name(&self) -> &str {
        "openai-compatible"
    }
}
