//! The `ChatModel` trait -- the adapter interface for hosted language models.
//!
//! Each concrete adapter (the OpenAI chat-completions API, test doubles)
//! implements this trait. It is object-safe so the gateway can hold an
//! `Arc<dyn ChatModel>`.

use async_trait::async_trait;

use super::types::{ChatCompletion, ChatRequest, ModelError};

/// Adapter interface for a hosted chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Human-readable adapter name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one non-streaming completion request.
    ///
    /// Implementations must not retry: a failed call is reported once.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, ModelError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ChatModel) {}
};
