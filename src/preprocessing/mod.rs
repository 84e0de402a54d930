//! Data preprocessing module
//!
//! Feature construction for the fare model:
//! - trip distance from coordinates (haversine), standard-scaled
//! - calendar features from the pickup timestamp, one-hot encoded
//! - a column-transformer composition of both branches

mod distance;
mod encoder;
mod pipeline;
mod scaler;
mod time_features;

pub use distance::{haversine_distance, DistanceTransformer};
pub use encoder::OneHotEncoder;
pub use pipeline::Preprocessor;
pub use scaler::StandardScaler;
pub use time_features::{TimeFeaturesEncoder, TIME_FEATURE_COLS};
