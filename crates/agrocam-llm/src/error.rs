//! Error types for agrocam-llm

use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// API error
    #[error("api error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit,

    /// Upstream server error (5xx)
    #[error("server error: {0}")]
    ServerError(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),
}

impl Error {
    /// Whether retrying the same request later may succeed
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimit | Self::ServerError(_) | Self::Network(_) | Self::Timeout(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::RateLimit.is_transient());
        assert!(Error::ServerError("503".into()).is_transient());
        assert!(Error::Timeout(30_000).is_transient());
        assert!(!Error::Api("bad request".into()).is_transient());
        assert!(!Error::NotConfigured("gemini".into()).is_transient());
    }
}
