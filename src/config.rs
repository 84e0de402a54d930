//! Trainer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the fare model trainer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Tracking server URI; when absent, tracking calls fail fast
    pub tracking_uri: Option<String>,

    /// Experiment name used to group tracking runs
    pub experiment_name: String,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Random seed for the train/test split
    pub random_state: Option<u64>,

    /// Path the fitted pipeline is serialized to
    pub model_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            tracking_uri: None,
            experiment_name: "taxifare".to_string(),
            test_size: 0.2,
            random_state: None,
            model_path: PathBuf::from("model.json"),
        }
    }
}

impl TrainerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tracking server URI
    pub fn with_tracking_uri(mut self, uri: impl Into<String>) -> Self {
        self.tracking_uri = Some(uri.into());
        self
    }

    /// Set the experiment name
    pub fn with_experiment_name(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = name.into();
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the split seed for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Set the model artifact path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainerConfig::default();
        assert!(config.tracking_uri.is_none());
        assert_eq!(config.test_size, 0.2);
    }

    #[test]
    fn test_builder() {
        let config = TrainerConfig::new()
            .with_tracking_uri("http://localhost:5000")
            .with_experiment_name("nyc_fares")
            .with_test_size(0.3)
            .with_random_state(42);
        assert_eq!(config.tracking_uri.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.experiment_name, "nyc_fares");
        assert_eq!(config.random_state, Some(42));
    }
}
