//! Error types for core types and configuration loading.

use thiserror::Error;

/// Errors from core type construction.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid size class: {0:?} (expected family.size, e.g. m1.small)")]
    InvalidSizeClass(String),
}

/// Errors raised while loading or validating `queuepilot.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no monitored services configured")]
    NoServices,

    #[error("monitored service has no deploy-side name: {0}")]
    UnknownService(String),

    #[error("no scaling policy for monitored service: {0}")]
    MissingPolicy(String),

    #[error(
        "policy for {service}: {direction} horizon {horizon} exceeds model horizon {model_horizon}"
    )]
    HorizonOutOfRange {
        service: String,
        direction: &'static str,
        horizon: usize,
        model_horizon: usize,
    },

    #[error("policy for {service}: horizons must be non-zero")]
    ZeroHorizon { service: String },

    #[error(
        "policy for {service}: downscale limit {downscale} must be below upscale limit {upscale}"
    )]
    InvertedLimits {
        service: String,
        upscale: f64,
        downscale: f64,
    },

    #[error("model horizon must be non-zero")]
    ZeroModelHorizon,

    #[error("smoothing window must be non-zero")]
    ZeroWindow,
}
