//! Preprocessing + regression fitted as one unit

use crate::error::{FareError, Result};
use crate::preprocessing::Preprocessor;
use super::linear_models::LinearRegression;
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// The full fare model: two-branch preprocessing followed by linear
/// regression, fit as a single unit. Serializable after fit, so the whole
/// pipeline round-trips through one JSON artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarePipeline {
    preprocessor: Preprocessor,
    model: LinearRegression,
    is_fitted: bool,
}

impl Default for FarePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl FarePipeline {
    pub fn new() -> Self {
        Self {
            preprocessor: Preprocessor::new(),
            model: LinearRegression::new(),
            is_fitted: false,
        }
    }

    /// Fit preprocessing on x, then the regressor on the transformed matrix
    pub fn fit(&mut self, x: &DataFrame, y: &[f64]) -> Result<&mut Self> {
        if x.height() != y.len() {
            return Err(FareError::Shape {
                expected: format!("y length = {}", x.height()),
                actual: format!("y length = {}", y.len()),
            });
        }

        let features = self.preprocessor.fit_transform(x)?;
        let target = Array1::from_vec(y.to_vec());
        self.model.fit(&features, &target)?;
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &DataFrame) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("FarePipeline".to_string()));
        }
        let features = self.preprocessor.transform(x)?;
        self.model.predict(&features)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Number of features the fitted preprocessor emits
    pub fn n_features(&self) -> usize {
        self.preprocessor.feature_names().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn rides() -> (DataFrame, Vec<f64>) {
        let x = df!(
            "pickup_datetime" => &[
                "2014-07-08 02:34:56 UTC",
                "2014-07-09 11:00:00 UTC",
                "2014-07-10 17:45:00 UTC",
                "2014-07-11 08:15:00 UTC",
            ],
            "pickup_latitude" => &[40.75, 40.76, 40.77, 40.73],
            "pickup_longitude" => &[-73.98, -73.97, -73.96, -73.99],
            "dropoff_latitude" => &[40.65, 40.66, 40.67, 40.68],
            "dropoff_longitude" => &[-73.95, -73.94, -73.93, -73.92]
        )
        .unwrap();
        let y = vec![11.5, 10.9, 10.7, 9.8];
        (x, y)
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = rides();
        let mut pipeline = FarePipeline::new();
        assert!(!pipeline.is_fitted());
        assert_eq!(pipeline.n_features(), 0);

        pipeline.fit(&x, &y).unwrap();
        assert!(pipeline.is_fitted());
        // 1 distance + 4 dows + 4 hours + 1 month + 1 year
        assert_eq!(pipeline.n_features(), 11);

        let pred = pipeline.predict(&x).unwrap();
        assert_eq!(pred.len(), 4);
        assert!(pred.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let (x, _) = rides();
        let pipeline = FarePipeline::new();
        assert!(matches!(
            pipeline.predict(&x),
            Err(FareError::NotFitted(_))
        ));
    }

    #[test]
    fn test_fit_rejects_length_mismatch() {
        let (x, _) = rides();
        let mut pipeline = FarePipeline::new();
        assert!(pipeline.fit(&x, &[1.0]).is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let (x, y) = rides();
        let mut pipeline = FarePipeline::new();
        pipeline.fit(&x, &y).unwrap();
        let expected = pipeline.predict(&x).unwrap();

        let json = serde_json::to_string(&pipeline).unwrap();
        let restored: FarePipeline = serde_json::from_str(&json).unwrap();
        let actual = restored.predict(&x).unwrap();
        assert_eq!(expected, actual);
    }
}
