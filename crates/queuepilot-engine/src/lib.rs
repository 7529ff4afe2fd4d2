//! queuepilot-engine — the decision engine and its pass loop.
//!
//! For each forecasted instance queue the engine emits exactly one action
//! per pass:
//!
//! ```text
//! max(forecast[..upscale_horizon]) > upscale_limit
//!   ├── recent upscale on record → RollingBack (undo it)
//!   └── otherwise               → Upscaling (next size up)
//! else max(forecast[..downscale_horizon]) < downscale_limit
//!   └──                           Downscaling (next size down)
//! else                            NoAction
//! ```
//!
//! The upscale/rollback branch is checked strictly before the downscale
//! branch: a forecast that trips both limits over its two horizons never
//! downscales in the same pass.
//!
//! The only state that survives a pass is the [`RollbackRegistry`]: every
//! successful upscale records the deployment and its instance set, and a
//! later over-limit forecast on one of those instances rolls the deployment
//! back instead of stacking another upscale on top. Entries expire after a
//! per-environment horizon, lazily at lookup.
//!
//! The registry is owned by the [`Scaler`] and only reachable through
//! `&mut self`, which serializes record/find/remove; evaluating queues in
//! parallel would need exactly one writer at a time to preserve the
//! one-live-candidate-per-instance invariant.

pub mod error;
pub mod rollback;
pub mod scaler;

pub use error::{EngineError, EngineResult};
pub use rollback::{RollbackCandidate, RollbackRegistry};
pub use scaler::{Decision, Scaler};
