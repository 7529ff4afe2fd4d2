//! queuepilot-core — shared types and configuration for QueuePilot.
//!
//! QueuePilot models each monitored service instance as a queueing system
//! and scales its instance size based on a utilization forecast. This crate
//! holds the vocabulary shared by every other crate: environments, size
//! classes, time series, the scaling policy config, and the size step tables
//! that map a current instance size to its upscale/downscale target.

pub mod config;
pub mod error;
pub mod names;
pub mod steps;
pub mod types;

pub use config::QueuePilotConfig;
pub use names::deploy_service_name;
pub use error::{ConfigError, CoreError};
pub use steps::SizeSteps;
pub use types::*;
