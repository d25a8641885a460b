//! Wire types for model-generated workout plans.
//!
//! These types map directly to the JSON object the model is instructed to
//! emit (`nome_ficha`, `dias_treino`, ...). Plan- and day-level structure is
//! strict; per-exercise fields are read leniently because models routinely
//! emit numbers where strings were requested.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Top-level plan object produced by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedPlan {
    /// Suggested plan name.
    #[serde(rename = "nome_ficha")]
    pub plan_name: String,
    /// Training days in the order the model listed them.
    #[serde(rename = "dias_treino")]
    pub training_days: Vec<TrainingDay>,
}

/// One training day (e.g. "A", "B") within a [`GeneratedPlan`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingDay {
    /// Day label, usually a letter.
    #[serde(
        rename = "dia",
        default,
        deserialize_with = "deserialize_loose_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub label: Option<String>,
    /// Muscle groups trained on this day (e.g. "Peito e Tríceps").
    #[serde(
        rename = "grupo_muscular",
        default,
        deserialize_with = "deserialize_loose_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub muscle_group: Option<String>,
    /// Exercises in prescribed order.
    #[serde(rename = "exercicios")]
    pub exercises: Vec<ExerciseDraft>,
}

/// A single exercise as proposed by the model, before reconciliation.
///
/// Deserializes from any JSON value: entries that are not objects, or whose
/// name is missing or not a string, yield a draft with `name == None`, which
/// the reconciliation engine skips.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Value")]
pub struct ExerciseDraft {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "series", skip_serializing_if = "Option::is_none")]
    pub sets: Option<String>,
    #[serde(rename = "repeticoes", skip_serializing_if = "Option::is_none")]
    pub reps: Option<String>,
    #[serde(rename = "tecnica_avancada", skip_serializing_if = "Option::is_none")]
    pub advanced_technique: Option<String>,
}

impl ExerciseDraft {
    /// Convenience constructor used by callers building drafts by hand.
    pub fn new(name: impl Into<String>, sets: impl Into<String>, reps: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            sets: Some(sets.into()),
            reps: Some(reps.into()),
            advanced_technique: None,
        }
    }

    /// The name to reconcile, if the model supplied a usable one.
    pub fn usable_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

impl From<Value> for ExerciseDraft {
    fn from(value: Value) -> Self {
        let Value::Object(fields) = value else {
            return Self::default();
        };

        // Some models answer with `exercicio` instead of `nome`; it wins when
        // both are present.
        let name = string_field(&fields, "exercicio").or_else(|| string_field(&fields, "nome"));

        Self {
            name,
            sets: text_field(&fields, "series"),
            reps: text_field(&fields, "repeticoes"),
            advanced_technique: string_field(&fields, "tecnica_avancada"),
        }
    }
}

/// Non-empty string value of `key`.
fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Non-empty string or number value of `key`, rendered as text.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(loose_text)
}

fn loose_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn deserialize_loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(loose_text(&value))
}
