//! Training orchestration
//!
//! `Trainer` wires the pieces together sequentially: build the pipeline,
//! fit it on the held training data, evaluate RMSE on held-out data, log
//! parameters and metrics to the tracking server, persist the artifact.

use crate::config::TrainerConfig;
use crate::error::{FareError, Result};
use crate::tracking::MlflowClient;
use crate::training::{compute_rmse, FarePipeline};
use ndarray::Array1;
use polars::prelude::DataFrame;
use std::fs;
use tracing::{debug, info};

/// Lifecycle of a Trainer: operations are gated on the current state so
/// out-of-order calls fail fast instead of panicking inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// No pipeline installed yet
    Unconfigured,
    /// Pipeline installed, not fitted
    Configured,
    /// Pipeline fitted; evaluate and save are available
    Fitted,
}

/// Orchestrates pipeline construction, fitting, evaluation and experiment
/// logging for one training attempt.
///
/// The tracking client, experiment id and run id are lazily created on
/// first access and cached for the Trainer's lifetime. First access of the
/// client binds it to the configured tracking URI. The check-then-init
/// accessors take `&mut self` and are not safe under concurrent first
/// access; the type is meant for single-threaded use.
pub struct Trainer {
    x: DataFrame,
    y: Vec<f64>,
    config: TrainerConfig,
    state: TrainerState,
    pipeline: Option<FarePipeline>,
    mlflow_client: Option<MlflowClient>,
    experiment_id: Option<String>,
    run_id: Option<String>,
}

impl Trainer {
    /// Store training features and target. No validation happens here;
    /// shape problems surface when the pipeline is fitted.
    pub fn new(x: DataFrame, y: Vec<f64>, config: TrainerConfig) -> Self {
        Self {
            x,
            y,
            config,
            state: TrainerState::Unconfigured,
            pipeline: None,
            mlflow_client: None,
            experiment_id: None,
            run_id: None,
        }
    }

    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Install the fixed two-branch pipeline, replacing any previous one.
    /// Re-setting after a fit drops the fitted state.
    pub fn set_pipeline(&mut self) {
        debug!("installing distance + time feature pipeline");
        self.pipeline = Some(FarePipeline::new());
        self.state = TrainerState::Configured;
    }

    /// Fit the installed pipeline to the stored training data
    pub fn run(&mut self) -> Result<()> {
        if self.state == TrainerState::Unconfigured {
            return Err(FareError::PipelineNotSet);
        }
        let pipeline = self.pipeline.as_mut().ok_or(FareError::PipelineNotSet)?;

        info!(rows = self.x.height(), "fitting fare pipeline");
        pipeline.fit(&self.x, &self.y)?;
        self.state = TrainerState::Fitted;
        Ok(())
    }

    /// Predict on held-out data and return the RMSE
    pub fn evaluate(&self, x_test: &DataFrame, y_test: &[f64]) -> Result<f64> {
        if self.state != TrainerState::Fitted {
            return Err(FareError::NotFitted("pipeline".to_string()));
        }
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| FareError::NotFitted("pipeline".to_string()))?;

        let predictions = pipeline.predict(x_test)?;
        let actuals = Array1::from_vec(y_test.to_vec());
        let rmse = compute_rmse(&predictions, &actuals)?;
        info!(rmse, rows = x_test.height(), "evaluated held-out data");
        Ok(rmse)
    }

    /// Lazily construct the tracking client; first access binds it to the
    /// configured URI
    pub fn mlflow_client(&mut self) -> Result<&MlflowClient> {
        match self.mlflow_client {
            Some(ref client) => Ok(client),
            None => {
                let uri = self.config.tracking_uri.clone().ok_or_else(|| {
                    FareError::Config("no tracking URI configured".to_string())
                })?;
                debug!(uri = %uri, "binding tracking client");
                Ok(self.mlflow_client.insert(MlflowClient::new(uri)))
            }
        }
    }

    /// Resolve the experiment id once per Trainer: looked up by name,
    /// created only if absent, then cached
    pub fn mlflow_experiment_id(&mut self) -> Result<String> {
        if let Some(ref id) = self.experiment_id {
            return Ok(id.clone());
        }
        let name = self.config.experiment_name.clone();
        let id = self.mlflow_client()?.get_or_create_experiment(&name)?;
        info!(experiment = %name, id = %id, "resolved tracking experiment");
        self.experiment_id = Some(id.clone());
        Ok(id)
    }

    /// Create one tracking run per Trainer and cache its id
    pub fn mlflow_run_id(&mut self) -> Result<String> {
        if let Some(ref id) = self.run_id {
            return Ok(id.clone());
        }
        let experiment_id = self.mlflow_experiment_id()?;
        let id = self.mlflow_client()?.create_run(&experiment_id)?;
        self.run_id = Some(id.clone());
        Ok(id)
    }

    /// Log a parameter under the memoized run
    pub fn mlflow_log_param(&mut self, key: &str, value: &str) -> Result<()> {
        let run_id = self.mlflow_run_id()?;
        self.mlflow_client()?.log_param(&run_id, key, value)
    }

    /// Log a metric under the memoized run
    pub fn mlflow_log_metric(&mut self, key: &str, value: f64) -> Result<()> {
        let run_id = self.mlflow_run_id()?;
        self.mlflow_client()?.log_metric(&run_id, key, value)
    }

    /// Serialize the fitted pipeline as JSON to the configured model path
    pub fn save_model(&self) -> Result<()> {
        if self.state != TrainerState::Fitted {
            return Err(FareError::NotFitted("pipeline".to_string()));
        }
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| FareError::NotFitted("pipeline".to_string()))?;

        let json = serde_json::to_string_pretty(pipeline)?;
        fs::write(&self.config.model_path, json)?;
        info!(path = %self.config.model_path.display(), "saved fitted pipeline");
        Ok(())
    }

    /// Load a previously saved pipeline artifact
    pub fn load_model(path: &std::path::Path) -> Result<FarePipeline> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn training_frame() -> (DataFrame, Vec<f64>) {
        let x = df!(
            "pickup_datetime" => &[
                "2014-07-08 02:34:56 UTC",
                "2014-07-09 11:00:00 UTC",
                "2014-07-10 17:45:00 UTC",
                "2014-07-11 08:15:00 UTC",
                "2014-07-12 20:30:00 UTC",
            ],
            "pickup_latitude" => &[40.75, 40.76, 40.77, 40.73, 40.74],
            "pickup_longitude" => &[-73.98, -73.97, -73.96, -73.99, -73.95],
            "dropoff_latitude" => &[40.65, 40.66, 40.67, 40.68, 40.69],
            "dropoff_longitude" => &[-73.95, -73.94, -73.93, -73.92, -73.91]
        )
        .unwrap();
        let y = vec![11.5, 10.9, 10.7, 9.8, 8.4];
        (x, y)
    }

    #[test]
    fn test_run_before_set_pipeline_fails() {
        let (x, y) = training_frame();
        let mut trainer = Trainer::new(x, y, TrainerConfig::default());
        assert!(matches!(trainer.run(), Err(FareError::PipelineNotSet)));
    }

    #[test]
    fn test_evaluate_before_run_fails() {
        let (x, y) = training_frame();
        let mut trainer = Trainer::new(x.clone(), y.clone(), TrainerConfig::default());
        trainer.set_pipeline();
        assert!(matches!(
            trainer.evaluate(&x, &y),
            Err(FareError::NotFitted(_))
        ));
    }

    #[test]
    fn test_full_sequence_transitions_state() {
        let (x, y) = training_frame();
        let mut trainer = Trainer::new(x.clone(), y.clone(), TrainerConfig::default());
        assert_eq!(trainer.state(), TrainerState::Unconfigured);

        trainer.set_pipeline();
        assert_eq!(trainer.state(), TrainerState::Configured);

        trainer.run().unwrap();
        assert_eq!(trainer.state(), TrainerState::Fitted);

        let rmse = trainer.evaluate(&x, &y).unwrap();
        assert!(rmse.is_finite() && rmse >= 0.0);
    }

    #[test]
    fn test_reset_pipeline_drops_fit() {
        let (x, y) = training_frame();
        let mut trainer = Trainer::new(x.clone(), y.clone(), TrainerConfig::default());
        trainer.set_pipeline();
        trainer.run().unwrap();

        trainer.set_pipeline();
        assert_eq!(trainer.state(), TrainerState::Configured);
        assert!(trainer.evaluate(&x, &y).is_err());
    }

    #[test]
    fn test_client_requires_tracking_uri() {
        let (x, y) = training_frame();
        let mut trainer = Trainer::new(x, y, TrainerConfig::default());
        assert!(matches!(
            trainer.mlflow_client(),
            Err(FareError::Config(_))
        ));
    }

    #[test]
    fn test_experiment_id_is_memoized() {
        let (x, y) = training_frame();
        // Nothing listens on this address; any remote call would error, so a
        // successful second access proves the cached id is returned without
        // touching the network.
        let config = TrainerConfig::default().with_tracking_uri("http://127.0.0.1:9");
        let mut trainer = Trainer::new(x, y, config);
        trainer.experiment_id = Some("42".to_string());

        assert_eq!(trainer.mlflow_experiment_id().unwrap(), "42");
        assert_eq!(trainer.mlflow_experiment_id().unwrap(), "42");
    }

    #[test]
    fn test_run_id_is_memoized() {
        let (x, y) = training_frame();
        let config = TrainerConfig::default().with_tracking_uri("http://127.0.0.1:9");
        let mut trainer = Trainer::new(x, y, config);
        trainer.run_id = Some("run-1".to_string());

        assert_eq!(trainer.mlflow_run_id().unwrap(), "run-1");
    }

    #[test]
    fn test_save_model_requires_fit() {
        let (x, y) = training_frame();
        let trainer = Trainer::new(x, y, TrainerConfig::default());
        assert!(matches!(
            trainer.save_model(),
            Err(FareError::NotFitted(_))
        ));
    }

    #[test]
    fn test_save_and_reload_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let (x, y) = training_frame();
        let config = TrainerConfig::default().with_model_path(&path);
        let mut trainer = Trainer::new(x.clone(), y, config);
        trainer.set_pipeline();
        trainer.run().unwrap();
        trainer.save_model().unwrap();

        let reloaded = Trainer::load_model(&path).unwrap();
        let restored = reloaded.predict(&x);
        assert!(restored.is_ok());
    }
}
