//! Editing session: the ordered exercise list a trainer works on before
//! saving a ficha.
//!
//! A session is a plain caller-owned value. Reconciliation seeds it (each
//! pass replaces the contents); the trainer then appends, removes by id or
//! clears.

pub mod ficha;

use chrono::NaiveDate;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::plan::GeneratedPlan;
use crate::reconcile::{
    ExerciseId, ReconcileOptions, ReconciledExercise, UNSPECIFIED_MUSCLE_GROUP, reconcile_plan,
};

pub use ficha::{Ficha, FichaError, read_ficha, write_ficha};

/// Errors editing a session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("required field is missing: {0}")]
    MissingField(&'static str),
}

/// Exercise typed in by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualExercise {
    pub muscle_group: String,
    pub name: String,
    pub sets: Option<u32>,
    pub reps: String,
    pub technique: Option<String>,
    pub note: Option<String>,
}

/// Counts shown next to the exercise list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditSession {
    exercises: Vec<ReconciledExercise>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session seeded with already reconciled exercises.
    pub fn from_exercises(exercises: Vec<ReconciledExercise>) -> Self {
        Self { exercises }
    }

    /// Session for re-editing a stored ficha.
    pub fn from_ficha(ficha: Ficha) -> Self {
        Self::from_exercises(ficha.exercises)
    }

    /// Reconcile `plan` and replace the whole session with the result.
    pub fn seed_from_plan(
        &mut self,
        plan: &GeneratedPlan,
        catalog: &Catalog,
        options: &ReconcileOptions,
    ) {
        self.replace(reconcile_plan(plan, catalog, options));
    }

    pub fn replace(&mut self, exercises: Vec<ReconciledExercise>) {
        self.exercises = exercises;
    }

    pub fn push(&mut self, exercise: ReconciledExercise) {
        self.exercises.push(exercise);
    }

    /// Append a hand-entered exercise.
    ///
    /// Name, sets and reps are required. The asset path is taken from the
    /// catalog entry with exactly the same name, if any.
    pub fn add_manual(
        &mut self,
        manual: ManualExercise,
        catalog: &Catalog,
    ) -> Result<&ReconciledExercise, SessionError> {
        let name = manual.name.trim();
        if name.is_empty() {
            return Err(SessionError::MissingField("exercicio"));
        }
        let sets = match manual.sets {
            Some(n) if n > 0 => n,
            _ => return Err(SessionError::MissingField("series")),
        };
        let reps = manual.reps.trim();
        if reps.is_empty() {
            return Err(SessionError::MissingField("repeticoes"));
        }

        let muscle_group = match manual.muscle_group.trim() {
            "" => UNSPECIFIED_MUSCLE_GROUP.to_string(),
            group => group.to_string(),
        };
        let asset_path = catalog.find_exact(name).map(|e| e.asset_path.clone());

        self.exercises.push(ReconciledExercise {
            id: ExerciseId::generate(),
            muscle_group,
            exercise_name: name.to_string(),
            sets,
            reps: reps.to_string(),
            technique: non_blank(manual.technique),
            note: non_blank(manual.note),
            asset_path,
        });
        let last = self.exercises.len() - 1;
        Ok(&self.exercises[last])
    }

    /// Remove the exercise with `id`, returning it.
    pub fn remove(&mut self, id: &ExerciseId) -> Option<ReconciledExercise> {
        let index = self.exercises.iter().position(|e| &e.id == id)?;
        Some(self.exercises.remove(index))
    }

    pub fn clear(&mut self) {
        self.exercises.clear();
    }

    pub fn exercises(&self) -> &[ReconciledExercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn summary(&self) -> SessionSummary {
        let matched = self.exercises.iter().filter(|e| e.is_matched()).count();
        SessionSummary {
            total: self.exercises.len(),
            matched,
            unmatched: self.exercises.len() - matched,
        }
    }

    /// Build the stored ficha from the current contents.
    pub fn to_ficha(
        &self,
        name: &str,
        change_date: NaiveDate,
        notes: impl Into<String>,
    ) -> Result<Ficha, FichaError> {
        let ficha = Ficha {
            name: name.trim().to_string(),
            change_date,
            notes: notes.into(),
            exercises: self.exercises.clone(),
        };
        ficha.validate()?;
        Ok(ficha)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
