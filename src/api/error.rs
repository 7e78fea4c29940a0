//! Error types for the image API client.

use thiserror::Error;

/// Errors that can occur while talking to the image API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connection reset...).
    #[error("network error: {0}")]
    Transport(String),

    /// The single-record endpoint has no image with this id.
    #[error("image not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("invalid response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether this is the distinct "missing record" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns a user-friendly error message suitable for display in the UI.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Transport(_) => "Could not reach the image service. Check your connection.",
            Self::NotFound(_) => "This image does not exist.",
            Self::Server { .. } => "The image service returned an error. Please try again.",
            Self::Parse(_) => "The image service sent an unexpected response.",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        assert!(ApiError::NotFound("does-not-exist".to_string()).is_not_found());
        assert!(!ApiError::Transport("reset".to_string()).is_not_found());
        assert!(!ApiError::Server {
            status: 500,
            message: "boom".to_string()
        }
        .is_not_found());
    }

    #[test]
    fn test_display_carries_description() {
        let err = ApiError::Server {
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "server error 503: Service Unavailable");
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: ApiError = serde_json::from_str::<Vec<u32>>("{").unwrap_err().into();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
