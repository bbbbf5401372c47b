//! Data concierge command line interface.
//!
//! # Usage
//!
//! ```bash
//! # One request, confirming on the console
//! concierge ask "monthly sales by region"
//!
//! # One request, accepting everything, JSON report
//! concierge ask "customer churn analysis" --yes --json
//!
//! # Interactive session
//! concierge session
//!
//! # Check configuration and connectivity
//! concierge diagnose
//! ```

mod commands;
mod console;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concierge_core::{load_config, validate_config, Config, Services};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(version)]
#[command(about = "Find existing data assets for a request, or open a ticket for the data team")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(long, short, global = true, env = "CONCIERGE_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single request
    Ask {
        /// The data request, in natural language
        request: String,

        /// Accept matches and escalations without asking
        #[arg(long, short)]
        yes: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive session: one request per line
    Session,

    /// Show configuration presence and service connectivity
    Diagnose,

    /// Print the configuration without secrets
    Config,
}

fn load(path: &Path) -> Result<Config> {
    let config =
        load_config(path).with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<bool> {
    let config = load(&cli.config)?;

    match cli.command {
        Commands::Ask { request, yes, json } => {
            let services =
                Services::from_config(&config).context("Failed to initialize services")?;
            commands::ask(&services, &request, yes, json).await
        }
        Commands::Session => {
            let services =
                Services::from_config(&config).context("Failed to initialize services")?;
            commands::session(&services).await?;
            Ok(true)
        }
        Commands::Diagnose => commands::diagnose(&config).await,
        Commands::Config => {
            commands::show_config(&config)?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
