mod catalog_cmd;
mod config;
mod generate_cmd;
mod pipeline;
mod reconcile_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use fitcraft_core::catalog::MuscleGroup;

use config::{FitcraftConfig, Overrides};
use pipeline::FichaOutput;

#[derive(Parser)]
#[command(
    name = "fitcraft",
    about = "AI-assisted workout plan generation with exercise catalog matching"
)]
struct Cli {
    /// Exercise catalog URL (overrides FITCRAFT_CATALOG_URL)
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Read the catalog from a local JSON file instead of the URL
    #[arg(long, global = true)]
    catalog_file: Option<PathBuf>,

    /// Minimum similarity (0-1) for a catalog match (overrides FITCRAFT_MATCH_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,

    /// Host prefixed to catalog asset paths (overrides FITCRAFT_ASSET_BASE_URL)
    #[arg(long, global = true)]
    asset_base_url: Option<String>,

    /// Model name (overrides FITCRAFT_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Model API base URL (overrides FITCRAFT_MODEL_BASE_URL)
    #[arg(long, global = true)]
    model_base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a fitcraft config file with default values
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the plan-generation HTTP gateway
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Generate a plan from a prompt and match it against the catalog
    Generate {
        /// Free-text description of the desired training
        prompt: String,
        /// Restrict the model to exercises from the catalog
        #[arg(long)]
        with_catalog: bool,
        /// Also write the raw generated plan JSON to this file
        #[arg(long)]
        save_plan: Option<PathBuf>,
        #[command(flatten)]
        ficha: FichaArgs,
    },
    /// Match a saved plan JSON against the catalog (no model call)
    Reconcile {
        /// Path to a generated plan JSON file
        plan_file: PathBuf,
        #[command(flatten)]
        ficha: FichaArgs,
    },
    /// Show the best catalog match for an exercise name
    Match {
        /// Exercise name as the model or trainer wrote it
        name: String,
    },
    /// Browse the exercise catalog by muscle group
    Catalog {
        /// Only show this group (e.g. peitoral, posteriores_de_coxa)
        #[arg(long)]
        group: Option<MuscleGroup>,
        /// Print the listing sent to the model instead
        #[arg(long, conflicts_with = "group")]
        listing: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct FichaArgs {
    /// Write the result as a ficha JSON file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Ficha name (defaults to the plan name)
    #[arg(long)]
    name: Option<String>,
    /// Plan change date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    change_date: Option<NaiveDate>,
    /// Notes for the client
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<FichaArgs> for FichaOutput {
    fn from(args: FichaArgs) -> Self {
        Self {
            path: args.output,
            name: args.name,
            change_date: args.change_date,
            notes: args.notes,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let (bind, port) = match &self.command {
            Commands::Serve { bind, port } => (bind.clone(), *port),
            _ => (None, None),
        };
        Overrides {
            model_base_url: self.model_base_url.clone(),
            model: self.model.clone(),
            catalog_url: self.catalog_url.clone(),
            asset_base_url: self.asset_base_url.clone(),
            threshold: self.threshold,
            bind,
            port,
        }
    }
}

/// Execute the `fitcraft init` command: write config file.
fn cmd_init(force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    config::save_config(&config::ConfigFile::with_defaults())?;

    println!("Config written to {}", path.display());
    println!();
    println!("The model API key is not stored there; export OPENAI_API_KEY before");
    println!("running `fitcraft generate` or `fitcraft serve`.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return cmd_init(force);
    }

    let resolved = FitcraftConfig::resolve(&cli.overrides())?;
    let catalog_file = cli.catalog_file.as_deref();

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Serve { .. } => {
            let gateway = pipeline::openai_gateway(&resolved)?;
            serve_cmd::run_serve(gateway, &resolved.bind, resolved.port).await?;
        }
        Commands::Generate {
            prompt,
            with_catalog,
            save_plan,
            ficha,
        } => {
            let gateway = pipeline::openai_gateway(&resolved)?;
            let source = pipeline::catalog_source(catalog_file, &resolved)?;
            let options = generate_cmd::GenerateOptions {
                prompt,
                with_catalog,
                save_plan,
                ficha: ficha.into(),
            };
            generate_cmd::run_generate(&resolved, &gateway, source.as_ref(), &options).await?;
        }
        Commands::Reconcile { plan_file, ficha } => {
            let source = pipeline::catalog_source(catalog_file, &resolved)?;
            reconcile_cmd::run_reconcile(&resolved, source.as_ref(), &plan_file, &ficha.into())
                .await?;
        }
        Commands::Match { name } => {
            let source = pipeline::catalog_source(catalog_file, &resolved)?;
            reconcile_cmd::run_match(&resolved, source.as_ref(), &name).await?;
        }
        Commands::Catalog { group, listing } => {
            let source = pipeline::catalog_source(catalog_file, &resolved)?;
            catalog_cmd::run_catalog(source.as_ref(), catalog_cmd::CatalogView { group, listing })
                .await?;
        }
    }

    Ok(())
}
