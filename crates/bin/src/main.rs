//! Fleetwise CLI binary.
//!
//! Provides command-line access to ingest, training and prediction.

use clap::{Parser, Subcommand};
use fleetwise::etl::{IngestOutput, NormalizeMethod, process_file};
use fleetwise::features::registry::available_features;
use fleetwise::load_fleet;
use fleetwise::runtime::{
    DEFAULT_MODEL_PATH, ModelHandle, PredictionService, Predictor, TrainConfig, Trainer,
    default_target,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "fleetwise")]
#[command(about = "Fleetwise: fleet telemetry ETL and elastic-net modelling", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, clean and normalize a raw telemetry CSV
    Ingest {
        /// Raw telemetry CSV
        input: PathBuf,

        /// Where to write the processed CSV (prints a preview when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Normalization method (zscore or minmax)
        #[arg(short, long, default_value = "zscore")]
        method: NormalizeMethod,
    },

    /// Engineer features and train a model on a fleet CSV
    Train {
        /// Fleet CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Target column (default: Failure if present, else Mileage (km))
        #[arg(short, long)]
        target: Option<String>,

        /// Where to write the model artifact
        #[arg(short, long, env = "FLEETWISE_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        output: PathBuf,

        /// Comma-separated feature columns (default: every non-target column)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Output format (json or text)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Engineer features from a fleet CSV and print predictions
    Predict {
        /// Fleet CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Model artifact
        #[arg(long, env = "FLEETWISE_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },

    /// Report whether a model artifact can be served
    Status {
        /// Model artifact
        #[arg(long, env = "FLEETWISE_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },

    /// List the derived features
    Features,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Ingest {
            input,
            output,
            method,
        } => ingest(&input, output.as_deref(), method)?,
        Commands::Train {
            input,
            target,
            output,
            features,
            format,
        } => train(&input, target, &output, features, &format)?,
        Commands::Predict { input, model } => predict(&input, &model)?,
        Commands::Status { model } => status(&model)?,
        Commands::Features => list_features(),
    }

    Ok(())
}

fn ingest(
    input: &Path,
    output: Option<&Path>,
    method: NormalizeMethod,
) -> Result<(), Box<dyn std::error::Error>> {
    match process_file(input, output, method)? {
        IngestOutput::Written(path) => println!("Processed data written to: {}", path.display()),
        IngestOutput::Frame(df) => {
            println!("Processed {} rows x {} columns", df.height(), df.width());
            println!("{}", df.head(Some(10)));
        }
    }
    Ok(())
}

fn train(
    input: &Path,
    target: Option<String>,
    output: &Path,
    features: Option<Vec<String>>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = load_fleet(input)?;
    let target = target.unwrap_or_else(|| default_target(&data).to_string());
    debug!(target = %target, rows = data.height(), "training input loaded");

    let config = TrainConfig {
        features,
        ..Default::default()
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?,
    );
    pb.set_message(format!("Training model for '{}'...", target));
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = match Trainer::new(config).train(&data, &target, output) {
        Ok(outcome) => {
            pb.finish_with_message("Training complete");
            outcome
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    if format == "json" {
        let output = json!({
            "model_path": outcome.path.display().to_string(),
            "report": outcome.report,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Model saved to: {}", outcome.path.display());
        print!("{}", outcome.report.to_text());
    }
    Ok(())
}

fn predict(input: &Path, model: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let predictor = Predictor::load(model)?;
    let data = load_fleet(input)?;
    let predictions = predictor.predict(&data)?;

    let output = json!({
        "target": predictor.target(),
        "predictions": predictions,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn status(model: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let service = PredictionService::new(Arc::new(ModelHandle::open(model)));
    println!("{}", serde_json::to_string_pretty(&service.status())?);
    Ok(())
}

fn list_features() {
    println!("\nDerived features:");
    println!("{}", "=".repeat(80));
    println!("{:<22} {:<10} {}", "Feature", "Category", "Description");
    println!("{}", "-".repeat(80));
    for feature in available_features() {
        println!(
            "{:<22} {:<10} {}",
            feature.name,
            feature.category.to_string(),
            feature.description
        );
        println!("{:<33} reads:  {}", "", feature.required_columns.join(", "));
        println!("{:<33} writes: {}", "", feature.output_columns.join(", "));
    }
    println!("{}", "=".repeat(80));
}
