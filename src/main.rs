//! Taxi fare trainer - entry point
//!
//! Runs the full sequence: load, clean, split, train, evaluate, print the
//! RMSE, log to the tracking server, save the fitted pipeline.

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use taxifare::data;
use taxifare::{Trainer, TrainerConfig};

#[derive(Parser)]
#[command(name = "taxifare")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a linear taxi-fare model and log the run to MLflow")]
struct Cli {
    /// Ride-records CSV file
    #[arg(short, long)]
    data: PathBuf,

    /// Experiment name on the tracking server
    #[arg(short, long, default_value = "taxifare")]
    experiment: String,

    /// MLflow tracking server URI; tracking is skipped when omitted
    #[arg(long)]
    tracking_uri: Option<String>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_size: f64,

    /// Random seed for the train/test split
    #[arg(long)]
    seed: Option<u64>,

    /// Path the fitted pipeline is written to
    #[arg(short, long, default_value = "model.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taxifare=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = TrainerConfig::new()
        .with_experiment_name(&cli.experiment)
        .with_test_size(cli.test_size)
        .with_model_path(&cli.output);
    if let Some(uri) = &cli.tracking_uri {
        config = config.with_tracking_uri(uri);
    }
    if let Some(seed) = cli.seed {
        config = config.with_random_state(seed);
    }

    let raw = data::load_csv(&cli.data)?;
    info!(rows = raw.height(), "loaded ride records");
    let cleaned = data::clean(&raw)?;
    info!(rows = cleaned.height(), "cleaned ride records");

    let (x, y) = data::pop_target(&cleaned)?;
    let (x_train, x_test, y_train, y_test) =
        data::train_test_split(&x, &y, config.test_size, config.random_state)?;

    let mut trainer = Trainer::new(x_train, y_train, config);
    trainer.set_pipeline();
    trainer.run()?;

    let rmse = trainer.evaluate(&x_test, &y_test)?;
    println!("The RMSE score of the model is: {rmse}");

    if cli.tracking_uri.is_some() {
        trainer.mlflow_log_param("estimator", "linear_regression")?;
        trainer.mlflow_log_metric("rmse", rmse)?;
    } else {
        warn!("no tracking URI configured, skipping experiment logging");
    }

    trainer.save_model()?;
    Ok(())
}
