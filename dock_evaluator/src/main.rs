use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analysis::convergence::analyze_rmsd_convergence;
use crate::analysis::roc::compare_roc_curves;
use crate::cli::{Cli, Commands};
use crate::config::{RmsdConfig, RocConfig};

mod analysis;
mod cli;
mod config;
mod data_handling;
mod error;
mod helper_functions;
mod models;

fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Roc(args) => {
            let config = RocConfig::from(args);
            info!("Starting ROC comparison for {}", config.input.display());
            compare_roc_curves(&config)
                .with_context(|| format!("ROC analysis of {} failed", config.input.display()))?;
        }
        Commands::Rmsd(args) => {
            let config = RmsdConfig::from(args);
            info!(
                "Starting RMSD convergence analysis in {}",
                config.base_dir.display()
            );
            analyze_rmsd_convergence(&config).with_context(|| {
                format!(
                    "RMSD analysis in {} failed",
                    config.base_dir.display()
                )
            })?;
        }
    }

    Ok(())
}
