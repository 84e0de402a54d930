//! Data loading, cleaning and splitting for NYC taxi ride records

use crate::error::{FareError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::path::Path;

/// Target column
pub const FARE_COL: &str = "fare_amount";
/// Ride timestamp column
pub const PICKUP_DATETIME_COL: &str = "pickup_datetime";
/// Geographic coordinate columns, in pipeline order
pub const COORDINATE_COLS: [&str; 4] = [
    "pickup_latitude",
    "pickup_longitude",
    "dropoff_latitude",
    "dropoff_longitude",
];

// NYC bounding box and sanity bounds used to discard corrupt records
const FARE_MAX: f64 = 4000.0;
const PASSENGER_MIN: f64 = 1.0;
const PASSENGER_MAX: f64 = 8.0;
const LON_MIN: f64 = -74.3;
const LON_MAX: f64 = -72.9;
const LAT_MIN: f64 = 40.5;
const LAT_MAX: f64 = 41.8;

/// Load a ride-records CSV into a DataFrame
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let file = File::open(path.as_ref())
        .map_err(|e| FareError::Data(format!("{}: {}", path.as_ref().display(), e)))?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file);

    reader.finish().map_err(|e| FareError::Data(e.to_string()))
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
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
}

/// Drop rows with nulls, implausible fares, passenger counts outside 1..=8,
/// and coordinates outside the NYC bounding box.
pub fn clean(df: &DataFrame) -> Result<DataFrame> {
    let df = df
        .drop_nulls::<String>(None)
        .map_err(|e| FareError::Data(e.to_string()))?;

    let fare = numeric_column(&df, FARE_COL)?;
    let pickup_lat = numeric_column(&df, COORDINATE_COLS[0])?;
    let pickup_lon = numeric_column(&df, COORDINATE_COLS[1])?;
    let dropoff_lat = numeric_column(&df, COORDINATE_COLS[2])?;
    let dropoff_lon = numeric_column(&df, COORDINATE_COLS[3])?;
    // Passenger count is optional in some extracts
    let passengers = if df.get_column_names().iter().any(|c| c.as_str() == "passenger_count") {
        Some(numeric_column(&df, "passenger_count")?)
    } else {
        None
    };

    let in_lat = |v: f64| (LAT_MIN..=LAT_MAX).contains(&v);
    let in_lon = |v: f64| (LON_MIN..=LON_MAX).contains(&v);

    let mask: BooleanChunked = (0..df.height())
        .map(|i| {
            let keep = fare.get(i).is_some_and(|f| f > 0.0 && f <= FARE_MAX)
                && pickup_lat.get(i).is_some_and(in_lat)
                && pickup_lon.get(i).is_some_and(in_lon)
                && dropoff_lat.get(i).is_some_and(in_lat)
                && dropoff_lon.get(i).is_some_and(in_lon)
                && passengers.as_ref().map_or(true, |p| {
                    p.get(i)
                        .is_some_and(|v| (PASSENGER_MIN..=PASSENGER_MAX).contains(&v))
                });
            Some(keep)
        })
        .collect();

    df.filter(&mask).map_err(|e| FareError::Data(e.to_string()))
}

/// Pop the fare column off a cleaned DataFrame, returning (features, target)
pub fn pop_target(df: &DataFrame) -> Result<(DataFrame, Vec<f64>)> {
    let y: Vec<f64> = numeric_column(df, FARE_COL)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    let x = df
        .drop(FARE_COL)
        .map_err(|e| FareError::Data(e.to_string()))?;
    Ok((x, y))
}

/// Random disjoint train/test split of a feature frame and target vector.
/// With a seed the shuffle is reproducible (ChaCha8).
pub fn train_test_split(
    x: &DataFrame,
    y: &[f64],
    test_size: f64,
    seed: Option<u64>,
) -> Result<(DataFrame, DataFrame, Vec<f64>, Vec<f64>)> {
    let n = x.height();
    if n != y.len() {
        return Err(FareError::Shape {
            expected: format!("y length = {}", n),
            actual: format!("y length = {}", y.len()),
        });
    }
    if n < 2 {
        return Err(FareError::Data(format!(
            "need at least 2 rows to split into train and test, got {}",
            n
        )));
    }
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(FareError::Config(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    match seed {
        Some(s) => {
            let mut rng = ChaCha8Rng::seed_from_u64(s);
            indices.shuffle(&mut rng);
        }
        None => {
            let mut rng = rand::thread_rng();
            indices.shuffle(&mut rng);
        }
    }

    let n_test = ((n as f64) * test_size).round() as usize;
    let n_test = n_test.clamp(1, n.saturating_sub(1));
    let (test_idx, train_idx) = indices.split_at(n_test);

    let take = |idx: &[usize]| -> Result<DataFrame> {
        let ca = IdxCa::from_vec("idx".into(), idx.iter().map(|&i| i as IdxSize).collect());
        x.take(&ca).map_err(|e| FareError::Data(e.to_string()))
    };

    let x_train = take(train_idx)?;
    let x_test = take(test_idx)?;
    let y_train: Vec<f64> = train_idx.iter().map(|&i| y[i]).collect();
    let y_test: Vec<f64> = test_idx.iter().map(|&i| y[i]).collect();

    Ok((x_train, x_test, y_train, y_test))
}
