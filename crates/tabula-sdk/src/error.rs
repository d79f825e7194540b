//! Error types for the Tabula SDK.

use thiserror::Error;

/// SDK operation errors
///
/// Every variant carries a message fit for showing to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// Well-formed error response from the service
    #[error("{message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// The service's `error` field, or a generic fallback
        message: String,
    },

    /// Connection error (network, DNS, refused, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A success response whose body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid client configuration (bad URL, TLS setup, etc.)
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl SdkError {
    /// True for failures where the service itself answered
    pub fn is_service_error(&self) -> bool {
        matches!(self, SdkError::Service { .. })
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SdkError::Timeout(e.to_string())
        } else if e.is_connect() || e.is_request() {
            SdkError::Connection(e.to_string())
        } else if e.is_decode() || e.is_body() {
            SdkError::MalformedResponse(e.to_string())
        } else if e.is_builder() {
            SdkError::Config(e.to_string())
        } else {
            SdkError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::MalformedResponse(format!("JSON parsing error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_displays_message_verbatim() {
        let err = SdkError::Service {
            status: 400,
            message: "class_name required".to_string(),
        };
        assert_eq!(err.to_string(), "class_name required");
        assert!(err.is_service_error());
    }

    #[test]
    fn test_json_error_is_malformed_response() {
        let err: SdkError = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert!(matches!(err, SdkError::MalformedResponse(_)));
    }
}
