//! Calendar feature extraction from the ride timestamp

use crate::error::{FareError, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Categorical calendar columns emitted by the encoder, in output order
pub const TIME_FEATURE_COLS: [&str; 4] = ["dow", "hour", "month", "year"];

/// Extracts day-of-week, hour, month and year from a timestamp column.
/// Timestamps are strings like "2014-07-08 02:34:56 UTC".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeFeaturesEncoder {
    time_column: String,
    is_fitted: bool,
}

impl TimeFeaturesEncoder {
    pub fn new(time_column: impl Into<String>) -> Self {
        Self {
            time_column: time_column.into(),
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if df.column(&self.time_column).is_err() {
            return Err(FareError::ColumnNotFound(self.time_column.clone()));
        }
        self.is_fitted = true;
        Ok(self)
    }

    /// Emit the four calendar columns as string categories
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(FareError::NotFitted("TimeFeaturesEncoder".to_string()));
        }

        let column = df
            .column(&self.time_column)
            .map_err(|_| FareError::ColumnNotFound(self.time_column.clone()))?;
        let timestamps = column
            .str()
            .map_err(|e| FareError::Preprocessing(e.to_string()))?;

        let mut dow = Vec::with_capacity(df.height());
        let mut hour = Vec::with_capacity(df.height());
        let mut month = Vec::with_capacity(df.height());
        let mut year = Vec::with_capacity(df.height());

        for value in timestamps.into_iter() {
            let raw = value.ok_or_else(|| {
                FareError::Preprocessing(format!("null timestamp in {}", self.time_column))
            })?;
            let dt = parse_timestamp(raw)?;
            dow.push(dt.weekday().num_days_from_monday().to_string());
            hour.push(dt.hour().to_string());
            month.push(dt.month().to_string());
            year.push(dt.year().to_string());
        }

        let columns = vec![
            Series::new(TIME_FEATURE_COLS[0].into(), dow).into(),
            Series::new(TIME_FEATURE_COLS[1].into(), hour).into(),
            Series::new(TIME_FEATURE_COLS[2].into(), month).into(),
            Series::new(TIME_FEATURE_COLS[3].into(), year).into(),
        ];
        DataFrame::new(columns).map_err(|e| FareError::Data(e.to_string()))
    }

    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim().trim_end_matches(" UTC");
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| FareError::Preprocessing(format!("bad timestamp '{}': {}", raw, e)))
}
