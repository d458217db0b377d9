//! Error types for the payvo library

use thiserror::Error;

/// Result type alias for payvo operations
pub type Result<T> = std::result::Result<T, PayvoError>;

/// Main error type for payvo operations
#[derive(Error, Debug)]
pub enum PayvoError {
    /// Caller-supplied precondition violated before any network I/O
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Remote service answered with a status >= 400
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure during the exchange
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded as JSON
    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Network operation attempted without an open session
    #[error("session is not open: call open() before issuing requests")]
    SessionClosed,
}

impl PayvoError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an HTTP status error carrying the raw response text
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Status code of an `Http` error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_display() {
        let err = PayvoError::http(404, r#"{"error":"not_found"}"#);
        assert_eq!(err.to_string(), r#"HTTP 404: {"error":"not_found"}"#);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = PayvoError::invalid_argument("return_url is required");
        assert_eq!(err.to_string(), "invalid argument: return_url is required");
        assert_eq!(err.status(), None);
    }
}
