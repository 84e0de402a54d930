//! Haversine distance feature

use crate::data::COORDINATE_COLS;
use crate::error::{FareError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinate pairs, in kilometers
pub fn haversine_distance(
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
) -> f64 {
    let d_lat = (end_lat - start_lat).to_radians();
    let d_lon = (end_lon - start_lon).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + start_lat.to_radians().cos() * end_lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Computes a single trip-distance column from the four coordinate columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceTransformer {
    is_fitted: bool,
}

impl Default for DistanceTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl DistanceTransformer {
    pub fn new() -> Self {
        Self { is_fitted: false }
    }

    /// Stateless transform, fit only verifies the columns are present
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        for col in COORDINATE_COLS {
            if df.column(col).is_err() {
                return Err(FareError::ColumnNotFound(col.to_string()));
            }
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Emit a one-column DataFrame holding the haversine distance per row
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("DistanceTransformer".to_string()));
        }

        let col = |name: &str| -> Result<Float64Chunked> {
            let column = df
                .column(name)
                .map_err(|_| FareError::ColumnNotFound(name.to_string()))?;
            let casted = column
                .cast(&DataType::Float64)
                .map_err(|e| FareError::Data(e.to_string()))?;
            Ok(casted
                .as_materialized_series()
                .f64()
                .map_err(|e| FareError::Data(e.to_string()))?
                .clone())
        };

        let pickup_lat = col(COORDINATE_COLS[0])?;
        let pickup_lon = col(COORDINATE_COLS[1])?;
        let dropoff_lat = col(COORDINATE_COLS[2])?;
        let dropoff_lon = col(COORDINATE_COLS[3])?;

        let distance: Float64Chunked = (0..df.height())
            .map(|i| {
                match (
                    pickup_lat.get(i),
                    pickup_lon.get(i),
                    dropoff_lat.get(i),
                    dropoff_lon.get(i),
                ) {
                    (Some(plat), Some(plon), Some(dlat), Some(dlon)) => {
                        Some(haversine_distance(plat, plon, dlat, dlon))
                    }
                    _ => None,
                }
            })
            .collect();

        let series = distance.with_name("distance".into()).into_series();
        DataFrame::new(vec![series.into()]).map_err(|e| FareError::Data(e.to_string()))
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}
