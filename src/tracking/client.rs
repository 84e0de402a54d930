//! MLflow REST client
//!
//! Blocking client for an MLflow-compatible tracking server. Each call is a
//! single synchronous request; there is no batching, retrying or buffering,
//! and failures propagate to the caller.

use crate::error::{FareError, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct CreateExperimentRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct ExperimentInfo {
    experiment_id: String,
}

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: ExperimentInfo,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    experiment_id: &'a str,
    start_time: i64,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

#[derive(Debug, Deserialize)]
struct Run {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: Run,
}

#[derive(Debug, Serialize)]
struct LogParamRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct LogMetricRequest<'a> {
    run_id: &'a str,
    key: &'a str,
    value: f64,
    timestamp: i64,
    step: i64,
}

/// Client for the MLflow tracking REST API (2.0)
#[derive(Debug, Clone)]
pub struct MlflowClient {
    client: Client,
    base_url: String,
}

impl MlflowClient {
    /// Bind a client to a tracking server URI
    pub fn new(tracking_uri: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: tracking_uri.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/2.0/mlflow/{}", self.base_url, path)
    }

    /// Create a new experiment, returning its id. Errors if the name is
    /// already taken; use [`get_or_create_experiment`](Self::get_or_create_experiment)
    /// for idempotent resolution.
    pub fn create_experiment(&self, name: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("experiments/create"))
            .json(&CreateExperimentRequest { name })
            .send()?;

        if !response.status().is_success() {
            return Err(FareError::Tracking(format!(
                "create_experiment failed with status {}",
                response.status()
            )));
        }

        let body: CreateExperimentResponse = response.json()?;
        Ok(body.experiment_id)
    }

    /// Look up an experiment by name; Ok(None) when it does not exist
    pub fn get_experiment_by_name(&self, name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.endpoint("experiments/get-by-name"))
            .query(&[("experiment_name", name)])
            .send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(FareError::Tracking(format!(
                "get_experiment_by_name failed with status {}",
                response.status()
            )));
        }

        let body: GetExperimentResponse = response.json()?;
        Ok(Some(body.experiment.experiment_id))
    }

    /// Resolve an experiment id: look up by name first, create only when
    /// absent. A lookup failure other than "not found" propagates instead of
    /// being misread as "already exists".
    pub fn get_or_create_experiment(&self, name: &str) -> Result<String> {
        match self.get_experiment_by_name(name)? {
            Some(id) => Ok(id),
            None => self.create_experiment(name),
        }
    }

    /// Create a run under an experiment, returning the run id
    pub fn create_run(&self, experiment_id: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("runs/create"))
            .json(&CreateRunRequest {
                experiment_id,
                start_time: Utc::now().timestamp_millis(),
            })
            .send()?;

        if !response.status().is_success() {
            return Err(FareError::Tracking(format!(
                "create_run failed with status {}",
                response.status()
            )));
        }

        let body: CreateRunResponse = response.json()?;
        Ok(body.run.info.run_id)
    }

    /// Log a string parameter under a run
    pub fn log_param(&self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("runs/log-parameter"))
            .json(&LogParamRequest { run_id, key, value })
            .send()?;

        if !response.status().is_success() {
            return Err(FareError::Tracking(format!(
                "log_param '{}' failed with status {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }

    /// Log a numeric metric under a run
    pub fn log_metric(&self, run_id: &str, key: &str, value: f64) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("runs/log-metric"))
            .json(&LogMetricRequest {
                run_id,
                key,
                value,
                timestamp: Utc::now().timestamp_millis(),
                step: 0,
            })
            .send()?;

        if !response.status().is_success() {
            return Err(FareError::Tracking(format!(
                "log_metric '{}' failed with status {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }

    /// The tracking server URI this client is bound to
    pub fn tracking_uri(&self) -> &str {
        &self.base_url
    }
}
