use super::error::ClientError;
use super::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;

/// A remote (or scripted) chat completion endpoint
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;

    fn name(&self) -> &str;
}

#[async_trait]
impl<C: ChatClient + ?Sized> ChatClient for Box<C> {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        (**self).chat(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
