//! Application layer for Emoji Alchemy.
//!
//! Wires the provider boundary from `alchemy-core` into the fusion service
//! and the per-session selection controller.

pub mod fusion_service;
pub mod prompt;
pub mod session;

pub use fusion_service::FusionService;
pub use session::{FusionOutcome, SessionController, SessionPhase, SessionState, SkipReason};
