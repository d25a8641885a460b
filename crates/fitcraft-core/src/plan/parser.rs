//! Model-output parser with structural validation.
//!
//! Parses the model's message content into a [`GeneratedPlan`] and checks:
//! - The content is a JSON document.
//! - It has the plan shape (`nome_ficha`, `dias_treino`, per-day `exercicios`).
//! - The plan name is not blank.
//! - There is at least one training day.

use serde_json::Value;
use thiserror::Error;

use super::types::GeneratedPlan;

/// Errors that can occur while parsing model output into a plan.
#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("model output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("model output does not match the plan shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("plan name is missing or empty")]
    MissingPlanName,

    #[error("plan must contain at least one training day")]
    NoTrainingDays,
}

/// Parse and validate the model's message content.
pub fn parse_generated_plan(content: &str) -> Result<GeneratedPlan, PlanParseError> {
    let value: Value = serde_json::from_str(content).map_err(PlanParseError::InvalidJson)?;
    plan_from_value(value)
}

/// Validate an already-decoded JSON value as a [`GeneratedPlan`].
pub fn plan_from_value(value: Value) -> Result<GeneratedPlan, PlanParseError> {
    let plan: GeneratedPlan = serde_json::from_value(value).map_err(PlanParseError::Shape)?;
    validate(&plan)?;
    Ok(plan)
}

fn validate(plan: &GeneratedPlan) -> Result<(), PlanParseError> {
    if plan.plan_name.trim().is_empty() {
        return Err(PlanParseError::MissingPlanName);
    }
    if plan.training_days.is_empty() {
        return Err(PlanParseError::NoTrainingDays);
    }
    Ok(())
}
