//! Exercise reconciliation: binding model-proposed exercise names to the
//! catalog.
//!
//! For every draft in day order, every catalog name is scored with
//! [`similarity`]. The best-scoring entry (first seen wins ties) is accepted
//! when it reaches the threshold; otherwise the model's literal name is kept
//! with no asset. Drafts without a usable name are skipped. The scan is a
//! plain O(drafts x catalog) loop with no indexing.

pub mod similarity;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogEntry};
use crate::plan::{ExerciseDraft, GeneratedPlan};

pub use similarity::{levenshtein, similarity};

/// Minimum similarity for a catalog match to be accepted.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Sets used when the model gives none or an unparseable value.
pub const DEFAULT_SETS: u32 = 3;

/// Repetitions used when the model gives none.
pub const DEFAULT_REPS: &str = "10-12";

/// Muscle group used when a training day does not name one.
pub const UNSPECIFIED_MUSCLE_GROUP: &str = "Não especificado";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Errors building reconciliation options.
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("match threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(f64),
}

/// Tunables for a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileOptions {
    threshold: f64,
}

impl ReconcileOptions {
    /// Options with a custom threshold in `[0, 1]`.
    pub fn with_threshold(threshold: f64) -> Result<Self, ReconcileError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ReconcileError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

/// Identifier of an exercise within an editing session.
///
/// Serialized as a string. Stored fichas written by older clients carry
/// numeric ids, which are accepted and kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ExerciseId(String);

impl ExerciseId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExerciseId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for ExerciseId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Self(s)),
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "exercise id must be a string or number, got {other}"
            ))),
        }
    }
}

/// An exercise ready for editing, display and storage.
///
/// Field names follow the stored ficha format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledExercise {
    pub id: ExerciseId,
    #[serde(rename = "grupoMuscular")]
    pub muscle_group: String,
    /// Catalog name when matched, the model's literal name otherwise.
    #[serde(rename = "exercicio")]
    pub exercise_name: String,
    #[serde(rename = "series")]
    pub sets: u32,
    #[serde(rename = "repeticoes")]
    pub reps: String,
    #[serde(rename = "tecnica", default)]
    pub technique: Option<String>,
    #[serde(rename = "observacao", default)]
    pub note: Option<String>,
    /// Present only when the exercise is bound to a catalog entry.
    #[serde(rename = "gifUrl", default)]
    pub asset_path: Option<String>,
}

impl ReconciledExercise {
    /// Whether this exercise is bound to a catalog entry.
    pub fn is_matched(&self) -> bool {
        self.asset_path.is_some()
    }
}

/// Best catalog candidate for a name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub score: f64,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Highest-scoring catalog entry for `name`.
///
/// Only strictly greater scores replace the current best, so the first
/// entry wins ties and entries scoring zero are never returned.
pub fn best_match<'a>(name: &str, catalog: &'a Catalog) -> Option<CatalogMatch<'a>> {
    let mut best: Option<CatalogMatch<'a>> = None;
    let mut best_score = 0.0;
    for entry in catalog.entries() {
        let score = similarity(name, &entry.name);
        if score > best_score {
            best_score = score;
            best = Some(CatalogMatch { entry, score });
        }
    }
    best
}

/// Best match for `name` if it clears the threshold.
pub fn accepted_match<'a>(
    name: &str,
    catalog: &'a Catalog,
    options: &ReconcileOptions,
) -> Option<CatalogMatch<'a>> {
    best_match(name, catalog).filter(|m| m.score >= options.threshold)
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Reconcile every exercise of `plan` against `catalog`.
///
/// Output order follows the plan: days in order, exercises in order.
pub fn reconcile_plan(
    plan: &GeneratedPlan,
    catalog: &Catalog,
    options: &ReconcileOptions,
) -> Vec<ReconciledExercise> {
    let mut exercises = Vec::new();
    let mut skipped = 0usize;

    for day in &plan.training_days {
        let muscle_group = day
            .muscle_group
            .as_deref()
            .filter(|g| !g.is_empty())
            .unwrap_or(UNSPECIFIED_MUSCLE_GROUP);

        for draft in &day.exercises {
            match reconcile_draft(draft, muscle_group, catalog, options) {
                Some(exercise) => exercises.push(exercise),
                None => skipped += 1,
            }
        }
    }

    let matched = exercises.iter().filter(|e| e.is_matched()).count();
    info!(
        total = exercises.len(),
        matched,
        unmatched = exercises.len() - matched,
        skipped,
        threshold = options.threshold,
        "plan reconciled against catalog"
    );
    exercises
}

/// Reconcile a single draft; `None` when it has no usable name.
pub fn reconcile_draft(
    draft: &ExerciseDraft,
    muscle_group: &str,
    catalog: &Catalog,
    options: &ReconcileOptions,
) -> Option<ReconciledExercise> {
    let name = draft.usable_name()?;

    let (exercise_name, asset_path) = match accepted_match(name, catalog, options) {
        Some(m) => {
            debug!(draft = name, matched = %m.entry.name, score = m.score, "catalog match accepted");
            (m.entry.name.clone(), Some(m.entry.asset_path.clone()))
        }
        None => {
            debug!(draft = name, "no catalog match, keeping model name");
            (name.to_string(), None)
        }
    };

    Some(ReconciledExercise {
        id: ExerciseId::generate(),
        muscle_group: muscle_group.to_string(),
        exercise_name,
        sets: parse_sets(draft.sets.as_deref()),
        reps: draft
            .reps
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REPS.to_string()),
        technique: draft.advanced_technique.clone().filter(|t| !t.is_empty()),
        note: None,
        asset_path,
    })
}

/// Leading positive integer of `raw` ("4", " 3 séries", "3-4"), or
/// [`DEFAULT_SETS`].
pub fn parse_sets(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return DEFAULT_SETS;
    };
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => DEFAULT_SETS,
    }
}
