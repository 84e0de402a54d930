//! Two-branch preprocessing: distance features and calendar features

use crate::data::{COORDINATE_COLS, PICKUP_DATETIME_COL};
use crate::error::{FareError, Result};
use super::{
    distance::DistanceTransformer,
    encoder::OneHotEncoder,
    scaler::StandardScaler,
    time_features::{TimeFeaturesEncoder, TIME_FEATURE_COLS},
};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column-transformer composition over a ride-records frame.
///
/// Two branches, combined column-wise:
/// - distance: DistanceTransformer over the four coordinate columns, then
///   standard scaling
/// - time: TimeFeaturesEncoder over the timestamp column, then one-hot
///   encoding with unknown-category tolerance
///
/// Every input column outside the two branches is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    distance: DistanceTransformer,
    scaler: StandardScaler,
    time_encoder: TimeFeaturesEncoder,
    onehot: OneHotEncoder,
    feature_names: Vec<String>,
    is_fitted: bool,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl Preprocessor {
    pub fn new() -> Self {
        Self {
            distance: DistanceTransformer::new(),
            scaler: StandardScaler::new(),
            time_encoder: TimeFeaturesEncoder::new(PICKUP_DATETIME_COL),
            onehot: OneHotEncoder::new(),
            feature_names: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit both branches on the training frame
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        for col in COORDINATE_COLS {
            if df.column(col).is_err() {
                return Err(FareError::ColumnNotFound(col.to_string()));
            }
        }

        let dist_df = self.distance.fit_transform(df)?;
        self.scaler.fit(&dist_df, &["distance"])?;

        let time_df = self.time_encoder.fit_transform(df)?;
        self.onehot.fit(&time_df, &TIME_FEATURE_COLS)?;

        self.feature_names = std::iter::once("distance".to_string())
            .chain(self.onehot.feature_names())
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Produce the numeric feature matrix, columns in `feature_names` order
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("Preprocessor".to_string()));
        }

        let dist_df = self.distance.transform(df)?;
        let scaled = self.scaler.transform(&dist_df)?;
        let time_df = self.time_encoder.transform(df)?;
        let encoded = self.onehot.transform(&time_df)?;

        let n_rows = df.height();
        let n_features = self.feature_names.len();
        let mut matrix = Array2::zeros((n_rows, n_features));

        let fill = |matrix: &mut Array2<f64>, j: usize, frame: &DataFrame, name: &str| -> Result<()> {
            let ca = frame
                .column(name)
                .map_err(|_| FareError::ColumnNotFound(name.to_string()))?
                .f64()
                .map_err(|e| FareError::Preprocessing(e.to_string()))?;
            for (i, value) in ca.into_iter().enumerate() {
                matrix[[i, j]] = value.ok_or_else(|| {
                    FareError::Preprocessing(format!("null value in feature {}", name))
                })?;
            }
            Ok(())
        };

        fill(&mut matrix, 0, &scaled, "distance")?;
        for (j, name) in self.feature_names.iter().enumerate().skip(1) {
            fill(&mut matrix, j, &encoded, name)?;
        }

        Ok(matrix)
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Output feature names after fit
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}
