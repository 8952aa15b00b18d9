//! Selection/session control.

mod controller;
mod state;

pub use controller::{FUSION_UNSTABLE_MESSAGE, FusionOutcome, SessionController, SkipReason};
pub use state::{SessionPhase, SessionState};
