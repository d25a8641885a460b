//! Persisted ficha format and JSON file helpers.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::ReconciledExercise;

/// Errors building, reading or writing a ficha.
#[derive(Debug, Error)]
pub enum FichaError {
    #[error("ficha name must not be empty")]
    MissingName,

    #[error("ficha must contain at least one exercise")]
    NoExercises,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ficha JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored workout plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ficha {
    pub name: String,
    /// Date the client should switch to the next plan.
    #[serde(rename = "data_troca")]
    pub change_date: NaiveDate,
    #[serde(rename = "observacoes", default)]
    pub notes: String,
    #[serde(rename = "exercicios", default)]
    pub exercises: Vec<ReconciledExercise>,
}

impl Ficha {
    /// Check the invariants required before a ficha is stored.
    pub fn validate(&self) -> Result<(), FichaError> {
        if self.name.trim().is_empty() {
            return Err(FichaError::MissingName);
        }
        if self.exercises.is_empty() {
            return Err(FichaError::NoExercises);
        }
        Ok(())
    }
}

/// Read a ficha from a JSON file.
pub fn read_ficha(path: &Path) -> Result<Ficha, FichaError> {
    let text = std::fs::read_to_string(path).map_err(|source| FichaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Validate and write a ficha as pretty-printed JSON.
pub fn write_ficha(path: &Path, ficha: &Ficha) -> Result<(), FichaError> {
    ficha.validate()?;
    let json = serde_json::to_string_pretty(ficha)?;
    std::fs::write(path, json).map_err(|source| FichaError::Io {
        path: path.to_path_buf(),
        source,
    })
}
