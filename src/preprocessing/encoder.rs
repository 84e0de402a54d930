//! One-hot encoding with unknown-category tolerance

use crate::error::{FareError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder over string columns.
///
/// Categories are learned at fit time; a value unseen during fit encodes as
/// all zeros at transform time rather than erroring (the handle-unknown
/// tolerance the fare pipeline relies on when test data contains calendar
/// values absent from the training split).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    // (column, sorted categories) pairs in fit order
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.categories.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| FareError::ColumnNotFound(col_name.to_string()))?;
            let ca = column
                .str()
                .map_err(|e| FareError::Preprocessing(e.to_string()))?;

            let unique: BTreeSet<String> =
                ca.into_iter().flatten().map(str::to_string).collect();
            self.categories
                .push((col_name.to_string(), unique.into_iter().collect()));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Output column names in the deterministic order transform emits them
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }

    /// Emit one indicator column per learned (column, category) pair
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("OneHotEncoder".to_string()));
        }

        let mut columns: Vec<Column> = Vec::new();
        for (col_name, cats) in &self.categories {
            let column = df
                .column(col_name)
                .map_err(|_| FareError::ColumnNotFound(col_name.clone()))?;
            let ca = column
                .str()
                .map_err(|e| FareError::Preprocessing(e.to_string()))?;

            for category in cats {
                let indicator: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                let name = format!("{}_{}", col_name, category);
                columns.push(Series::new(name.into(), indicator).into());
            }
        }

        DataFrame::new(columns).map_err(|e| FareError::Data(e.to_string()))
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}
