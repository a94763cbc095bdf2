//! Gemini provider configuration

use crate::error::{Error, Result};
use crate::util::{mask_api_key, validate_api_key};
use std::fmt;
use std::time::Duration;

/// Default API base URL
pub(crate) const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini models the agents may be configured with
pub const MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.0-flash-001",
    "gemini-2.0-flash-lite-001",
];

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";

/// Next cheaper model to fall back to after repeated 429s
pub(crate) fn downgrade_model(model: &str) -> Option<&'static str> {
    match model {
        "gemini-2.5-pro" => Some("gemini-2.5-flash"),
        "gemini-2.5-flash" => Some("gemini-2.0-flash-001"),
        "gemini-2.0-flash" | "gemini-2.0-flash-001" => Some("gemini-2.0-flash-lite-001"),
        _ => None,
    }
}

/// Gemini provider configuration
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (sent as `?key=`)
    pub api_key: String,
    /// Base URL
    pub base_url: String,
    /// Default model
    pub default_model: String,
    /// Default max tokens
    pub default_max_tokens: u32,
    /// Request timeout
    pub timeout: Duration,
    /// Same-model retries on 429 or 5xx before downgrading
    pub max_retries: u32,
}

// Never print the key
impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl GeminiConfig {
    /// Create a new configuration with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            default_max_tokens: 8192,
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads `GEMINI_API_KEY` (or `GOOGLE_API_KEY`), plus optional
    /// `GEMINI_BASE_URL` and `GEMINI_MODEL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| Error::NotConfigured("GEMINI_API_KEY est requis".to_string()))?;

        if let Some(problem) = validate_api_key(&api_key, "Gemini") {
            return Err(Error::NotConfigured(problem));
        }

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("GEMINI_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.default_model = model;
        }
        Ok(config)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the default max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the same-model retry count
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}
