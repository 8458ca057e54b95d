//! Settings file loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use typochunk_core::budget::ContextBudget;
use typochunk_core::prompt::DEFAULT_REWRITE_INSTRUCTION;
use typochunk_core::retry::RetryConfig;
use typochunk_core::StructureConfig;

use crate::prelude::*;

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Everything the settings file can hold. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub structure: StructureConfig,
    pub budget: ContextBudget,
    pub retry: RetryConfig,
    pub model: ModelSettings,
}

/// Rewriting model and how it is prompted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub ollama_url: String,
    pub model: String,
    /// Sent ahead of every chunk piece.
    pub instruction: String,
    pub temperature: f64,
    pub max_tokens: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            instruction: DEFAULT_REWRITE_INSTRUCTION.to_string(),
            temperature: 0.8,
            max_tokens: 1024,
        }
    }
}

/// Load settings from `path`, or defaults when no path is given.
///
/// A path that was asked for but cannot be read is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };

    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let settings: Settings = toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))?;

    log::debug!("loaded settings from {}", path.display());
    Ok(settings)
}
