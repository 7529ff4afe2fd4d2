//! queuepilot-forecast — the gate between raw series and the forecasting
//! collaborator.
//!
//! The decision engine never talks to a forecasting implementation
//! directly. [`Forecaster`] is the capability seam: given a smoothed series
//! and a model selection it either produces `{fitted, mean, method}` or
//! signals "insufficient data". [`ForecastGate`] wraps a `Forecaster` and
//! adds the engine-side policy:
//!
//! - a series whose recent window is all zeros is dormant — skip it before
//!   ever calling the collaborator;
//! - the forecast must cover the configured horizon exactly;
//! - collaborator failures are recoverable (queue skipped for the pass).
//!
//! [`ForecastClient`] implements `Forecaster` against the forecast service
//! over HTTP.

pub mod client;
pub mod error;
pub mod gate;

pub use client::ForecastClient;
pub use error::{ForecastError, ForecastResult};
pub use gate::{ForecastGate, ForecastOutput, Forecaster};
