//! Domain layer for Emoji Alchemy.
//!
//! Holds the fusion result model, the selection rules, the built-in symbol
//! catalog, configuration types and the provider boundary that the
//! interaction layer implements.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fusion;
pub mod provider;
pub mod selection;
pub mod symbol;

pub use error::{AlchemyError, Result};
pub use fusion::{FusionResult, HistoryEntry, Rarity};
pub use provider::{FusionProvider, FusionRequest, ProviderError};
pub use selection::{SelectionError, SelectionSet, ToggleOutcome};
pub use symbol::Symbol;
