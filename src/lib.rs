//! Taxi fare regression trainer
//!
//! A small training crate for a linear-regression taxi-fare model:
//! - [`data`] - CSV loading, record cleaning, train/test splitting
//! - [`preprocessing`] - distance and calendar feature branches
//! - [`training`] - linear regression, the composed pipeline, metrics
//! - [`tracking`] - MLflow-compatible experiment tracking client
//! - [`trainer`] - the orchestration type tying it all together

pub mod config;
pub mod data;
pub mod error;
pub mod preprocessing;
pub mod tracking;
pub mod trainer;
pub mod training;

pub use config::TrainerConfig;
pub use error::{FareError, Result};
pub use trainer::{Trainer, TrainerState};
pub use training::FarePipeline;
