//! Runtime configuration read from the process environment

use std::env;

use crate::error::FinsightError;
use crate::Result;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Settings for the LLM service
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Build configuration from environment variables.
    ///
    /// A missing API key is not an error here; the analyzer reports it
    /// when an analysis is attempted.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match non_empty("PORT").or_else(|| non_empty("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| FinsightError::Config(format!("Invalid port: {}", raw)))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes: usize = match non_empty("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                FinsightError::Config(format!("Invalid MAX_UPLOAD_BYTES: {}", raw))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            llm: LlmConfig {
                api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
                model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: non_empty("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
            port,
            max_upload_bytes,
        })
    }
}
