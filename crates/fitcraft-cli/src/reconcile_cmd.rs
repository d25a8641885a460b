//! `fitcraft reconcile` and `fitcraft match`: offline catalog matching.

use std::path::Path;

use anyhow::{Context, Result};

use fitcraft_core::catalog::{CatalogSource, asset_url};
use fitcraft_core::plan::parse_generated_plan;
use fitcraft_core::reconcile::best_match;
use fitcraft_core::session::EditSession;

use crate::config::FitcraftConfig;
use crate::pipeline::{self, FichaOutput};

/// Reconcile a previously saved plan JSON against the catalog.
pub async fn run_reconcile(
    config: &FitcraftConfig,
    source: &dyn CatalogSource,
    plan_file: &Path,
    ficha: &FichaOutput,
) -> Result<()> {
    let content = std::fs::read_to_string(plan_file)
        .with_context(|| format!("failed to read plan file: {}", plan_file.display()))?;
    let plan = parse_generated_plan(&content)
        .with_context(|| format!("failed to parse plan file: {}", plan_file.display()))?;

    let catalog = pipeline::load_catalog(source).await?;
    let mut session = EditSession::new();
    session.seed_from_plan(&plan, &catalog, &config.reconcile);

    println!("Plan: {}\n", plan.plan_name);
    println!("{}", pipeline::render_session(&session, &config.asset_base_url));
    pipeline::save_ficha(&session, &plan.plan_name, ficha)
}

/// Show the best catalog candidate for one exercise name.
pub async fn run_match(config: &FitcraftConfig, source: &dyn CatalogSource, name: &str) -> Result<()> {
    let catalog = pipeline::load_catalog(source).await?;
    let threshold = config.reconcile.threshold();

    match best_match(name, &catalog) {
        Some(m) => {
            let verdict = if m.score >= threshold {
                "accepted"
            } else {
                "rejected"
            };
            println!("Best match: {} ({})", m.entry.name, m.entry.category);
            println!("Score:      {:.3} ({verdict}, threshold {threshold})", m.score);
            if !m.entry.asset_path.is_empty() {
                println!("Asset:      {}", asset_url(&config.asset_base_url, &m.entry.asset_path));
            }
        }
        None => println!("No catalog entry resembles {name:?}."),
    }
    Ok(())
}
