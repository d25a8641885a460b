//! Pieces shared by the `generate` and `reconcile` commands: catalog and
//! model construction, session rendering, ficha output.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use fitcraft_core::catalog::{
    Catalog, CatalogSource, FileCatalogSource, HttpCatalogSource, asset_url,
};
use fitcraft_core::gateway::PlanGateway;
use fitcraft_core::model::{OpenAiChatModel, OpenAiConfig};
use fitcraft_core::reconcile::ReconciledExercise;
use fitcraft_core::session::{EditSession, write_ficha};

use crate::config::FitcraftConfig;

/// Where to save the reconciled session as a ficha.
#[derive(Debug, Clone, Default)]
pub struct FichaOutput {
    pub path: Option<PathBuf>,
    /// Ficha name; the plan name when absent.
    pub name: Option<String>,
    /// Change date; today when absent.
    pub change_date: Option<NaiveDate>,
    pub notes: String,
}

/// Catalog source: a local file when given, the configured URL otherwise.
pub fn catalog_source(
    file: Option<&Path>,
    config: &FitcraftConfig,
) -> Result<Box<dyn CatalogSource>> {
    match file {
        Some(path) => Ok(Box::new(FileCatalogSource::new(path))),
        None => Ok(Box::new(HttpCatalogSource::new(&config.catalog_url)?)),
    }
}

/// Fetch the catalog once; failure aborts the command.
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog> {
    let catalog = source
        .fetch()
        .await
        .with_context(|| format!("failed to load exercise catalog from {}", source.describe()))?;
    tracing::info!(entries = catalog.len(), source = %source.describe(), "catalog ready");
    Ok(catalog)
}

/// Gateway backed by the OpenAI adapter; the key comes from the environment.
pub fn openai_gateway(config: &FitcraftConfig) -> Result<PlanGateway> {
    let model_config = OpenAiConfig::from_env()?
        .with_base_url(&config.model_base_url)
        .with_model(&config.model);
    let model = OpenAiChatModel::new(model_config)?;
    Ok(PlanGateway::new(Arc::new(model)))
}

/// Render the session as a fixed-width table followed by a summary line.
pub fn render_session(session: &EditSession, asset_base_url: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<3} {:<22} {:<34} {:>5} {:<12} {}\n",
        "#", "GROUP", "EXERCISE", "SETS", "REPS", "ASSET"
    ));
    out.push_str(&format!("{}\n", "-".repeat(100)));
    for (i, exercise) in session.exercises().iter().enumerate() {
        out.push_str(&render_row(i + 1, exercise, asset_base_url));
        out.push('\n');
    }
    let summary = session.summary();
    out.push_str(&format!(
        "\n{} exercise(s): {} matched, {} not in catalog",
        summary.total, summary.matched, summary.unmatched
    ));
    out
}

fn render_row(position: usize, exercise: &ReconciledExercise, asset_base_url: &str) -> String {
    let asset = exercise
        .asset_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| asset_url(asset_base_url, p))
        .unwrap_or_else(|| "-".to_string());
    let mut row = format!(
        "{:<3} {:<22} {:<34} {:>5} {:<12} {}",
        position,
        truncate(&exercise.muscle_group, 22),
        truncate(&exercise.exercise_name, 34),
        exercise.sets,
        truncate(&exercise.reps, 12),
        asset
    );
    if let Some(technique) = &exercise.technique {
        row.push_str(&format!("\n    technique: {technique}"));
    }
    row
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let head: String = s.chars().take(width - 3).collect();
        format!("{head}...")
    }
}

/// Write the session as a ficha if an output path was requested.
pub fn save_ficha(session: &EditSession, plan_name: &str, output: &FichaOutput) -> Result<()> {
    let Some(path) = &output.path else {
        return Ok(());
    };
    let name = output.name.as_deref().unwrap_or(plan_name);
    let change_date = output
        .change_date
        .unwrap_or_else(|| Local::now().date_naive());

    let ficha = session
        .to_ficha(name, change_date, output.notes.clone())
        .context("cannot build ficha from session")?;
    write_ficha(path, &ficha)?;
    println!("Ficha written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitcraft_core::reconcile::ExerciseId;

    fn exercise(name: &str, asset: Option<&str>) -> ReconciledExercise {
        ReconciledExercise {
            id: ExerciseId::generate(),
            muscle_group: "Peito e Tríceps".to_string(),
            exercise_name: name.to_string(),
            sets: 4,
            reps: "8-12".to_string(),
            technique: None,
            note: None,
            asset_path: asset.map(str::to_string),
        }
    }

    #[test]
    fn render_lists_rows_and_summary() {
        let session = EditSession::from_exercises(vec![
            exercise("Supino Reto", Some("/peitoral/supino-reto.gif")),
            exercise("Flexão com palmas", None),
        ]);
        let out = render_session(&session, "https://gifs.example");
        assert!(out.contains("https://gifs.example/peitoral/supino-reto.gif"));
        assert!(out.contains("Flexão com palmas"));
        assert!(out.ends_with("2 exercise(s): 1 matched, 1 not in catalog"));
    }

    #[test]
    fn render_shows_technique() {
        let mut ex = exercise("Supino Reto", None);
        ex.technique = Some("Drop-set".to_string());
        let out = render_session(&EditSession::from_exercises(vec![ex]), "https://x");
        assert!(out.contains("technique: Drop-set"));
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("Supino", 10), "Supino");
        assert_eq!(truncate("Supino Inclinado com Halteres", 10), "Supino ...");
        assert_eq!(truncate("Elevação Lateral", 8).chars().count(), 8);
    }

    #[test]
    fn save_ficha_without_path_is_noop() {
        let session = EditSession::new();
        assert!(save_ficha(&session, "Treino", &FichaOutput::default()).is_ok());
    }

    #[test]
    fn save_ficha_uses_plan_name_and_given_date() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ficha.json");
        let session =
            EditSession::from_exercises(vec![exercise("Supino Reto", Some("/p.gif"))]);
        let output = FichaOutput {
            path: Some(path.clone()),
            name: None,
            change_date: NaiveDate::from_ymd_opt(2025, 5, 1),
            notes: "Sem carga no primeiro dia".to_string(),
        };
        save_ficha(&session, "Treino A", &output).unwrap();

        let ficha = fitcraft_core::session::read_ficha(&path).unwrap();
        assert_eq!(ficha.name, "Treino A");
        assert_eq!(ficha.change_date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(ficha.notes, "Sem carga no primeiro dia");
    }

    #[test]
    fn save_ficha_rejects_empty_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = FichaOutput {
            path: Some(dir.path().join("ficha.json")),
            ..FichaOutput::default()
        };
        let err = save_ficha(&EditSession::new(), "Treino", &output).unwrap_err();
        assert!(format!("{err:#}").contains("at least one exercise"), "got: {err:#}");
    }
}
