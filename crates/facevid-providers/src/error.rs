//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured: {0}")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no usable content: {0}")]
    EmptyResponse(String),

    #[error("failed to decode provider payload: {0}")]
    Decode(String),

    #[error("operation {operation} failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("operation {operation} did not complete within {secs}s")]
    OperationTimeout { operation: String, secs: u64 },
}

impl ProviderError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn empty_response(msg: impl Into<String>) -> Self {
        Self::EmptyResponse(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether a whole-run retry by the caller could plausibly succeed.
    ///
    /// Transport errors, 5xx responses and timeouts are transient; schema
    /// and decode problems are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Http(_) => true,
            ProviderError::Status { status, .. } => *status >= 500 || *status == 429,
            ProviderError::OperationTimeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::status(500, "boom").is_transient());
        assert!(ProviderError::status(429, "slow down").is_transient());
        assert!(!ProviderError::status(400, "bad request").is_transient());
        assert!(!ProviderError::decode("not json").is_transient());
        assert!(ProviderError::OperationTimeout {
            operation: "op/123".into(),
            secs: 300
        }
        .is_transient());
    }
}
