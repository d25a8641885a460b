//! `fitcraft generate`: prompt -> model -> reconciliation -> ficha.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use fitcraft_core::catalog::CatalogSource;
use fitcraft_core::gateway::{GatewayError, GenerateRequest, PlanGateway};
use fitcraft_core::plan::GeneratedPlan;
use fitcraft_core::session::EditSession;

use crate::config::FitcraftConfig;
use crate::pipeline::{self, FichaOutput};

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub prompt: String,
    /// Restrict the model to the catalog by embedding its listing.
    pub with_catalog: bool,
    /// Also write the raw generated plan as JSON.
    pub save_plan: Option<PathBuf>,
    pub ficha: FichaOutput,
}

pub async fn run_generate(
    config: &FitcraftConfig,
    gateway: &PlanGateway,
    source: &dyn CatalogSource,
    options: &GenerateOptions,
) -> Result<()> {
    // Catalog before model: an unavailable catalog must not reach the model.
    let catalog = pipeline::load_catalog(source).await?;

    let mut request = GenerateRequest::new(&options.prompt);
    if options.with_catalog {
        request = request.with_catalog_listing(catalog.format_listing());
    }

    println!("Generating plan with {}...", gateway.model_name());
    let plan = generate(gateway, &request).await?;
    println!(
        "Plan: {} ({} training day(s))\n",
        plan.plan_name,
        plan.training_days.len()
    );

    if let Some(path) = &options.save_plan {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write plan to {}", path.display()))?;
        println!("Plan written to {}", path.display());
    }

    let mut session = EditSession::new();
    session.seed_from_plan(&plan, &catalog, &config.reconcile);
    println!("{}", pipeline::render_session(&session, &config.asset_base_url));

    pipeline::save_ficha(&session, &plan.plan_name, &options.ficha)
}

async fn generate(gateway: &PlanGateway, request: &GenerateRequest) -> Result<GeneratedPlan> {
    match gateway.generate(request).await {
        Ok(plan) => Ok(plan),
        Err(GatewayError::Upstream { status, body }) => {
            bail!("model service returned HTTP {status}: {body}")
        }
        Err(e) => Err(e).context("plan generation failed"),
    }
}
