//! Standard (z-score) feature scaling

use crate::error::{FareError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Fitted per-column statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnStats {
    mean: f64,
    std: f64,
}

/// Standard scaler: (x - mean) / std per column.
/// Columns with zero variance pass through unscaled (std treated as 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    // (column, stats) pairs in fit order
    params: Vec<(String, ColumnStats)>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| FareError::ColumnNotFound(col_name.to_string()))?;
            let ca = column
                .f64()
                .map_err(|e| FareError::Preprocessing(e.to_string()))?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(1).unwrap_or(1.0);
            let stats = ColumnStats {
                mean,
                std: if std == 0.0 { 1.0 } else { std },
            };
            self.params.push((col_name.to_string(), stats));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its z-scored values
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("StandardScaler".to_string()));
        }

        let mut result = df.clone();
        for (col_name, stats) in &self.params {
            let column = result
                .column(col_name)
                .map_err(|_| FareError::ColumnNotFound(col_name.clone()))?;
            let ca = column
                .f64()
                .map_err(|e| FareError::Preprocessing(e.to_string()))?;

            let scaled: Float64Chunked = ca
                .into_iter()
                .map(|opt| opt.map(|v| (v - stats.mean) / stats.std))
                .collect();
            let series = scaled.with_name(col_name.as_str().into()).into_series();

            result = result
                .with_column(series)
                .map_err(|e| FareError::Data(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}
