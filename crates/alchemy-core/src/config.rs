//! Configuration for Emoji Alchemy.
//!
//! Non-secret settings come from a TOML file; the API key is read from the
//! environment only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AlchemyError, Result};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
pub const MODEL_VAR: &str = "GEMINI_MODEL";

const APP_DIR: &str = "emoji-alchemy";
const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AlchemyConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GeminiSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeminiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Session behavior.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct SessionConfig {
    /// Keep at most this many history entries. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_limit: Option<usize>,
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AlchemyConfig {
    /// `<config_dir>/emoji-alchemy/config.toml`, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlchemyError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            self.gemini.model = model.trim().to_string();
        }
    }
}

/// Reads the provider API key from the process environment.
pub fn api_key_from_env() -> Result<String> {
    api_key_from(|key| std::env::var(key).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
        .ok_or_else(|| {
            AlchemyError::config(format!(
                "No API key found; set {}",
                API_KEY_VARS.join(" or ")
            ))
        })
}
