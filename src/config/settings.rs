//! Run settings and configuration types.
//!
//! Defaults describe a stock local deployment. A `triage.json` file in the
//! working directory may override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name probed for deployment overrides.
pub const SETTINGS_FILE: &str = "triage.json";

/// Errors raised while loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid endpoint URL {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Top-level settings for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// JSON document holding the emails to classify.
    pub input_path: PathBuf,
    /// Destination of the results array; replaced on every run.
    pub output_path: PathBuf,
    /// Inference endpoint configuration.
    pub ai: AiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("emails.json"),
            output_path: PathBuf::from("email_analysis_results.json"),
            ai: AiSettings::default(),
        }
    }
}

/// Chat endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// Full URL of the chat endpoint (Ollama `/api/chat`).
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Upper bound on a single request, in seconds.
    pub request_timeout_secs: u64,
    /// How model replies are parsed.
    pub reply_parsing: ReplyParsing,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434/api/chat".to_string(),
            model: "mistral".to_string(),
            request_timeout_secs: 30,
            reply_parsing: ReplyParsing::Strict,
        }
    }
}

impl AiSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Reply parsing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyParsing {
    /// Parse the reply content exactly as returned.
    #[default]
    Strict,
    /// Drop text outside the outermost braces before parsing.
    Lenient,
}

impl Settings {
    /// Loads settings from `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path` if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            tracing::info!(path = %path.display(), "Loading settings");
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), SettingsError> {
        url::Url::parse(&self.ai.endpoint).map_err(|source| SettingsError::InvalidEndpoint {
            url: self.ai.endpoint.clone(),
            source,
        })?;
        if self.ai.request_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(())
    }
}
