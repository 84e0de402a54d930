//! Experiment tracking
//!
//! Remote MLflow-compatible tracking: experiments group runs, a run records
//! one training attempt's parameters and metrics.

mod client;

pub use client::MlflowClient;
