//! Configuration loaded from `~/.takeoff/config.toml`.
//!
//! ```toml
//! [api_keys]
//! google = "..."
//!
//! [google]
//! model = "gemini-2.0-flash-exp"
//! reference_document = "https://generativelanguage.googleapis.com/v1beta/files/abc123"
//! reference_mime_type = "application/pdf"
//! ```
//!
//! Environment variables take precedence over the file: `GEMINI_API_KEY`
//! for the key, `TAKEOFF_REFERENCE_DOCUMENT` for the document URI.

use serde::Deserialize;
use std::{env, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Default, Deserialize)]
pub struct TakeoffConfig {
    pub api_keys: Option<ApiKeys>,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field(
                "google",
                &if self.google.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

/// Google Gemini request defaults.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleConfig {
    /// Model name. Defaults to the client's pinned model when absent.
    pub model: Option<String>,
    /// URI of the uploaded reference document to attach to every prompt.
    pub reference_document: Option<String>,
    /// MIME type of the reference document. Default: `application/pdf`.
    pub reference_mime_type: Option<String>,
}

impl TakeoffConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Resolved Google API key: environment first, then the config file.
    #[must_use]
    pub fn google_api_key(&self) -> Option<String> {
        non_empty_env("GEMINI_API_KEY")
            .or_else(|| self.api_keys.as_ref().and_then(|keys| keys.google.clone()))
    }

    /// Configured model name, if any.
    #[must_use]
    pub fn google_model(&self) -> Option<String> {
        self.google.as_ref().and_then(|google| google.model.clone())
    }

    /// Resolved reference-document URI: environment first, then the file.
    #[must_use]
    pub fn reference_document(&self) -> Option<String> {
        non_empty_env("TAKEOFF_REFERENCE_DOCUMENT").or_else(|| {
            self.google
                .as_ref()
                .and_then(|google| google.reference_document.clone())
        })
    }

    /// MIME type for the reference document.
    #[must_use]
    pub fn reference_mime_type(&self) -> String {
        self.google
            .as_ref()
            .and_then(|google| google.reference_mime_type.clone())
            .unwrap_or_else(|| "application/pdf".to_string())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".takeoff").join("config.toml"))
}
