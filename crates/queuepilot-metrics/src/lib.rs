//! queuepilot-metrics — metrics retrieval and series ingest.
//!
//! Talks to a Graphite-style `/render` API and turns its raw per-instance
//! series into smoothed, gap-filled time series grouped by
//! environment/service/instance:
//!
//! ```text
//! GraphiteClient (MetricsSource)
//!   └── render() → Vec<RenderSeries>          raw {name, start, step, values}
//!
//! ingest
//!   ├── smooth() → trailing moving average, zero-filled gaps
//!   └── group_by_instance() → env → service → instance → TimeSeries
//!
//! targets
//!   └── render_targets() → arrival-rate / service-time queries per service
//! ```
//!
//! Gap handling is deliberate: a window with any missing sample smooths to
//! zero, and points before the first full window are zero too. Downstream,
//! the forecast gate treats a long trailing run of zeros as "no usable
//! data", so a legitimately idle instance and a silent one look the same
//! here.

pub mod error;
pub mod ingest;
pub mod namespace;
pub mod render;
pub mod targets;

pub use error::{IngestError, IngestResult};
pub use ingest::{SeriesMap, group_by_instance, smooth};
pub use render::{GraphiteClient, MetricsSource, RenderSeries};
pub use targets::{Targets, render_targets};
