//! Error types for cv-cloud

use thiserror::Error;

/// Result type for cv-cloud operations
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors that can occur talking to OpenRouter or Supabase.
#[derive(Error, Debug)]
pub enum CloudError {
    /// The HTTP request itself failed (DNS, connect, TLS, transport).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout errors
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The remote service returned a non-success status with a body worth surfacing.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication errors (missing/invalid API key)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit errors
    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimit(u32),

    /// Request validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl CloudError {
    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<CloudError> for cv_models::ModelError {
    fn from(err: CloudError) -> Self {
        match err {
            CloudError::Http(e) => cv_models::ModelError::HttpError(e),
            CloudError::Timeout(d) => {
                cv_models::ModelError::InferenceError(format!("cloud request timed out after {d:?}"))
            }
            other => cv_models::ModelError::InferenceError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CloudError::auth("missing API key");
        assert!(matches!(err, CloudError::Auth(_)));
    }

    #[test]
    fn test_error_display() {
        let err = CloudError::RateLimit(60);
        assert_eq!(err.to_string(), "Rate limit exceeded, retry after 60s");
    }

    #[test]
    fn converts_into_model_error() {
        let err: cv_models::ModelError = CloudError::validation("bad request").into();
        assert!(matches!(err, cv_models::ModelError::InferenceError(_)));
    }
}
