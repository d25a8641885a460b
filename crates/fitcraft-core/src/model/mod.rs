//! Chat model adapter interface.
//!
//! ```text
//! PlanGateway --complete(ChatRequest)--> &dyn ChatModel
//!                                          |
//!                                          +-- OpenAiChatModel (reqwest)
//! ```

pub mod openai;
pub mod trait_def;
pub mod types;

pub use openai::{OpenAiChatModel, OpenAiConfig};
pub use trait_def::ChatModel;
pub use types::{ChatCompletion, ChatMessage, ChatRequest, ModelError, ResponseFormat, Role};
