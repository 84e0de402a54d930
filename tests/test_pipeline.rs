//! Integration tests: preprocessing and pipeline behavior

use polars::prelude::*;
use taxifare::preprocessing::{haversine_distance, Preprocessor};
use taxifare::FarePipeline;

fn synthetic_rides(n: usize) -> (DataFrame, Vec<f64>) {
    let mut timestamps = Vec::with_capacity(n);
    let mut pickup_lat = Vec::with_capacity(n);
    let mut pickup_lon = Vec::with_capacity(n);
    let mut dropoff_lat = Vec::with_capacity(n);
    let mut dropoff_lon = Vec::with_capacity(n);
    let mut fares = Vec::with_capacity(n);

    for i in 0..n {
        let day = 1 + (i % 28);
        let hour = i % 24;
        timestamps.push(format!("2014-07-{:02} {:02}:15:00 UTC", day, hour));

        let plat = 40.70 + (i % 10) as f64 * 0.006;
        let plon = -74.00 + (i % 7) as f64 * 0.008;
        let dlat = 40.75 - (i % 5) as f64 * 0.009;
        let dlon = -73.95 - (i % 4) as f64 * 0.007;
        pickup_lat.push(plat);
        pickup_lon.push(plon);
        dropoff_lat.push(dlat);
        dropoff_lon.push(dlon);

        let distance = haversine_distance(plat, plon, dlat, dlon);
        fares.push(2.5 + 2.7 * distance + (hour as f64) * 0.05);
    }

    let x = df!(
        "pickup_datetime" => timestamps,
        "pickup_latitude" => pickup_lat,
        "pickup_longitude" => pickup_lon,
        "dropoff_latitude" => dropoff_lat,
        "dropoff_longitude" => dropoff_lon
    )
    .unwrap();
    (x, fares)
}

#[test]
fn test_preprocessor_drops_extra_columns() {
    let (x, _) = synthetic_rides(30);
    let mut with_extra = x.clone();
    with_extra
        .with_column(Series::new(
            "passenger_count".into(),
            (0..30).map(|i| 1 + (i % 4) as i64).collect::<Vec<_>>(),
        ))
        .unwrap();

    let mut a = Preprocessor::new();
    let mut b = Preprocessor::new();
    let plain = a.fit_transform(&x).unwrap();
    let extra = b.fit_transform(&with_extra).unwrap();

    assert_eq!(plain.ncols(), extra.ncols());
    assert_eq!(plain, extra);
}

#[test]
fn test_pipeline_predictions_track_distance() {
    let (x, y) = synthetic_rides(60);
    let mut pipeline = FarePipeline::new();
    pipeline.fit(&x, &y).unwrap();

    let pred = pipeline.predict(&x).unwrap();
    // Fares are mostly linear in distance, so in-sample fit should be close
    let max_err = pred
        .iter()
        .zip(y.iter())
        .map(|(p, a)| (p - a).abs())
        .fold(0.0f64, f64::max);
    assert!(max_err < 2.0, "max in-sample error {}", max_err);
}

#[test]
fn test_pipeline_tolerates_unseen_calendar_values() {
    let (x, y) = synthetic_rides(48);
    let mut pipeline = FarePipeline::new();
    pipeline.fit(&x, &y).unwrap();

    // A timestamp from a month and year absent from training: the one-hot
    // branch encodes unknowns as zeros rather than erroring
    let test = df!(
        "pickup_datetime" => &["2015-12-25 23:45:00 UTC"],
        "pickup_latitude" => &[40.72],
        "pickup_longitude" => &[-73.99],
        "dropoff_latitude" => &[40.76],
        "dropoff_longitude" => &[-73.94]
    )
    .unwrap();

    let pred = pipeline.predict(&test).unwrap();
    assert_eq!(pred.len(), 1);
    assert!(pred[0].is_finite());
}

#[test]
fn test_pipeline_serialization_preserves_predictions() {
    let (x, y) = synthetic_rides(40);
    let mut pipeline = FarePipeline::new();
    pipeline.fit(&x, &y).unwrap();
    let expected = pipeline.predict(&x).unwrap();

    let json = serde_json::to_string(&pipeline).unwrap();
    let restored: FarePipeline = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.predict(&x).unwrap(), expected);
}
