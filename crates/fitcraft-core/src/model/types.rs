//! Request/response types shared by all chat model adapters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Output mode requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Free text.
    #[default]
    Text,
    /// The model must answer with a single JSON object.
    JsonObject,
}

impl ResponseFormat {
    /// Wire value of the `response_format.type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::JsonObject => "json_object",
        }
    }
}

/// A single non-streaming completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub response_format: ResponseFormat,
}

impl ChatRequest {
    /// Build a JSON-mode request from a system and a user message.
    pub fn json(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            response_format: ResponseFormat::JsonObject,
        }
    }

    /// Content of the first message with the given role.
    pub fn message(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

/// The assistant message returned by a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    /// Raw message content.
    pub content: String,
    /// Model that served the request, when reported.
    pub model: Option<String>,
}

/// Errors returned by chat model adapters.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The service answered with a non-success status.
    #[error("model service returned HTTP {status}")]
    Upstream { status: u16, body: String },

    /// The request never produced an HTTP response.
    #[error("model service request failed: {0}")]
    Transport(String),

    /// The response was a success but not a completion we can read.
    #[error("model service response could not be decoded: {0}")]
    Decode(String),

    /// The completion carried no message content.
    #[error("model service returned no message content")]
    EmptyResponse,

    #[error("{0} is not set")]
    MissingApiKey(&'static str),
}
