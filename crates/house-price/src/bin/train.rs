//! Train the house price model and write `house_model.pkl`.
//!
//! Reads `House Price Prediction Dataset.csv` from the working directory.
//! Set `RUST_LOG` to change log verbosity.

use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use house_price::data::DataError;
use house_price::{train_artifact, ForestConfig, TrainError, TrainSummary, TrainerPaths};

fn main() -> ExitCode {
    if let Err(e) = init_tracing() {
        eprintln!("failed to initialize logging: {e:#}");
    }

    let paths = TrainerPaths::default();
    match run(&paths) {
        Ok(summary) => {
            info!(rows = summary.n_rows, trees = summary.n_trees, "training complete");
            println!("Success! '{}' has been saved.", summary.artifact.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.downcast_ref::<TrainError>() {
                Some(TrainError::Data(DataError::NotFound { path })) => {
                    println!("Error: '{}' not found.", path.display());
                }
                _ => println!("Error: {e:#}"),
            }
            error!(error = %format!("{e:#}"), "training failed");
            ExitCode::FAILURE
        }
    }
}

fn run(paths: &TrainerPaths) -> Result<TrainSummary> {
    let config = ForestConfig::builder()
        .build()
        .context("invalid default forest configuration")?;
    info!(
        dataset = %paths.dataset.display(),
        trees = config.n_trees,
        seed = config.seed,
        "starting training"
    );
    let summary = train_artifact(paths, config)?;
    Ok(summary)
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("house_price=info".parse()?))
        .try_init()?;
    Ok(())
}
