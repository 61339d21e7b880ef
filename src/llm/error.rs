//! Errors raised while talking to the chat completion endpoint

use thiserror::Error;

/// Errors that can occur during a chat completion request
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The endpoint answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Credentials were rejected
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Rate limit exceeded, optionally with a server-provided wait in seconds
    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Connection or protocol failure before a response arrived
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The body could not be decoded or had no usable choice
    #[error("Invalid response from endpoint: {message}")]
    InvalidResponse { message: String },
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(seconds) => format!(", retry after {} seconds", seconds),
        None => String::new(),
    }
}
