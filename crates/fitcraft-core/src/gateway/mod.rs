//! Plan-generation gateway.
//!
//! Stateless: validates the request, builds the constrained prompt, makes a
//! single JSON-mode completion call and parses the answer into a
//! [`GeneratedPlan`]. Nothing is retried.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::model::{ChatModel, ChatRequest, ModelError};
use crate::plan::{self, GeneratedPlan, PlanParseError};

/// Input to [`PlanGateway::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Free-text description of the desired training. Required.
    pub training_prompt: String,
    /// Pre-formatted exercise listing to restrict the model to.
    pub catalog_listing: Option<String>,
}

impl GenerateRequest {
    pub fn new(training_prompt: impl Into<String>) -> Self {
        Self {
            training_prompt: training_prompt.into(),
            catalog_listing: None,
        }
    }

    pub fn with_catalog_listing(mut self, listing: impl Into<String>) -> Self {
        self.catalog_listing = Some(listing.into());
        self
    }
}

/// Errors surfaced by the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Caller input is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The model service answered with a non-success status.
    #[error("model service returned HTTP {status}")]
    Upstream { status: u16, body: String },

    /// The model service could not be called at all.
    #[error("model service unavailable: {0}")]
    ModelUnavailable(String),

    /// The model answered, but not with a usable plan.
    #[error("model returned a malformed plan: {0}")]
    MalformedModelOutput(String),
}

impl From<ModelError> for GatewayError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Upstream { status, body } => Self::Upstream { status, body },
            ModelError::Transport(_) | ModelError::MissingApiKey(_) => {
                Self::ModelUnavailable(err.to_string())
            }
            ModelError::Decode(_) | ModelError::EmptyResponse => {
                Self::MalformedModelOutput(err.to_string())
            }
        }
    }
}

impl From<PlanParseError> for GatewayError {
    fn from(err: PlanParseError) -> Self {
        Self::MalformedModelOutput(err.to_string())
    }
}

/// Gateway between trainers' free-text requests and the chat model.
#[derive(Clone)]
pub struct PlanGateway {
    model: Arc<dyn ChatModel>,
}

impl PlanGateway {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Name of the underlying model adapter.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Validate `request` and build the completion request for it.
    pub fn build_chat_request(request: &GenerateRequest) -> Result<ChatRequest, GatewayError> {
        if request.training_prompt.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "training prompt is required".to_string(),
            ));
        }
        let system = plan::build_system_prompt(request.catalog_listing.as_deref());
        let user = plan::build_user_prompt(&request.training_prompt);
        Ok(ChatRequest::json(system, user))
    }

    /// Generate a plan for `request`.
    #[instrument(skip_all, fields(model = %self.model.name()))]
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedPlan, GatewayError> {
        let chat_request = Self::build_chat_request(request)?;
        let completion = self.model.complete(&chat_request).await?;

        let plan = plan::parse_generated_plan(&completion.content).map_err(|e| {
            warn!(error = %e, "model output rejected");
            GatewayError::from(e)
        })?;

        info!(
            plan = %plan.plan_name,
            days = plan.training_days.len(),
            "plan generated"
        );
        Ok(plan)
    }
}
