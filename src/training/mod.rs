//! Model training module
//!
//! Linear regression, the composed fare pipeline, and regression metrics.

mod linear_models;
pub mod metrics;
mod pipeline;

pub use linear_models::LinearRegression;
pub use metrics::{compute_mae, compute_rmse, r_squared};
pub use pipeline::FarePipeline;
