//! OpsDesk Access: decides whether an actor may open a gated tool, and
//! keeps the actor's tenant resolved for those decisions.
//!
//! Everything here is generic over the `opsdesk-core` repository traits,
//! so this crate has no dependency on the database crate.

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
mod lookup;
pub mod tracker;

pub use config::AccessConfig;
pub use context::{SessionProfile, TenantContext, TenantState};
pub use error::{AccessError, Lookup};
pub use gate::AccessGate;
pub use tracker::{AccessTracker, EvaluationStamp, TrackedDecision};
