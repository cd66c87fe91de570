pub mod controller;
pub mod loop_worker;
pub mod types;

pub use controller::PredictionPoller;
pub use loop_worker::PollerConfig;
pub use types::{Prediction, PredictionSet, DEFAULT_CONFIDENCE_THRESHOLD};
