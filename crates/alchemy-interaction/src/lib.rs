//! Provider implementations for Emoji Alchemy.

pub mod gemini_api_agent;

pub use gemini_api_agent::GeminiFusionClient;
