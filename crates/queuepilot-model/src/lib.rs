//! queuepilot-model — the queueing model behind QueuePilot's decisions.
//!
//! Each monitored instance is treated as a single-server queue. From two
//! instrumented series — request service time and transaction arrival rate —
//! the model derives:
//!
//! ```text
//! utilization[i]    = service_time[i] * arrival_rate[i]        (ρ = λ·E[S])
//! residency_time[i] = service_time[i] / (1 - utilization[i] * service_time[i])
//! ```
//!
//! A non-positive residency denominator means the queue is unstable at that
//! point; the value is reported in-band as [`ResidencyPoint::Unstable`]
//! rather than a numeric NaN.
//!
//! [`InstanceQueue`] bundles the raw and derived series with the instance's
//! identity (environment, service, instance id, size class) for one
//! evaluation pass; queues carry no identity across passes.

pub mod error;
pub mod queue;
pub mod utilization;

pub use error::{ModelError, ModelResult};
pub use queue::{Forecast, InstanceQueue};
pub use utilization::ResidencyPoint;
