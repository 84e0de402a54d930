//! Regression metrics

use crate::error::{FareError, Result};
use ndarray::Array1;

fn check_lengths(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<()> {
    if predictions.len() != actuals.len() {
        return Err(FareError::Shape {
            expected: format!("{} predictions", actuals.len()),
            actual: format!("{} predictions", predictions.len()),
        });
    }
    if predictions.is_empty() {
        return Err(FareError::Training("empty prediction vector".to_string()));
    }
    Ok(())
}

/// Root-mean-squared error
pub fn compute_rmse(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64> {
    check_lengths(predictions, actuals)?;
    let n = predictions.len() as f64;
    let mse = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / n;
    Ok(mse.sqrt())
}

/// Mean absolute error
pub fn compute_mae(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64> {
    check_lengths(predictions, actuals)?;
    let n = predictions.len() as f64;
    Ok(predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).abs())
        .sum::<f64>()
        / n)
}

/// Coefficient of determination
pub fn r_squared(predictions: &Array1<f64>, actuals: &Array1<f64>) -> Result<f64> {
    check_lengths(predictions, actuals)?;
    let mean = actuals.mean().unwrap_or(0.0);
    let ss_tot: f64 = actuals.iter().map(|a| (a - mean).powi(2)).sum();
    let ss_res: f64 = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (a - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rmse_perfect_prediction() {
        let y = array![1.0, 2.0, 3.0];
        assert_eq!(compute_rmse(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn test_rmse_known_value() {
        let pred = array![2.0, 4.0];
        let actual = array![1.0, 3.0];
        assert!((compute_rmse(&pred, &actual).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse_length_mismatch() {
        let pred = array![1.0];
        let actual = array![1.0, 2.0];
        assert!(compute_rmse(&pred, &actual).is_err());
    }

    #[test]
    fn test_rmse_empty_input() {
        let empty: Array1<f64> = array![];
        assert!(compute_rmse(&empty, &empty).is_err());
    }

    #[test]
    fn test_mae() {
        let pred = array![2.0, 0.0];
        let actual = array![1.0, 3.0];
        assert!((compute_mae(&pred, &actual).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_perfect() {
        let y = array![1.0, 2.0, 3.0];
        assert!((r_squared(&y, &y).unwrap() - 1.0).abs() < 1e-12);
    }
}
