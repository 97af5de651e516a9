//! Error taxonomy shared by every Rentfolio crate.
//!
//! The resource client never panics across its public boundary: every
//! request resolves to `Result<T, ApiError>`, and callers decide whether to
//! retry based on the classification helpers below.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied input failed a precondition. Never sent over the
    /// network and never worth retrying.
    #[error("{message}")]
    Validation { message: String },

    /// The request could not reach the server.
    #[error("network error: {message}")]
    Network { message: String },

    /// The request exceeded the fixed timeout ceiling. Classified together
    /// with `Network` for retry purposes.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The server rejected the request (4xx other than 404).
    #[error("{message}")]
    Client { status: u16, message: String },

    #[error("resource not found: {resource}")]
    NotFound { resource: String },

    /// Server-side failure (5xx). Retryable with backoff.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("unsupported bulk action: {0}")]
    UnsupportedAction(String),

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Request never reached the server (or timed out on the way).
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// The server rejected the request; re-sending the same request will
    /// not help.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Client { .. } | Self::NotFound { .. })
    }

    /// Network and server failures are worth retrying; everything else is
    /// deterministic.
    pub fn is_retryable(&self) -> bool {
        self.is_network_error() || self.is_server_error()
    }

    /// Retry policy helper: retryable and still under the attempt budget.
    pub fn should_retry(&self, retry_count: u32, max_retries: u32) -> bool {
        retry_count < max_retries && self.is_retryable()
    }

    /// Human-readable fallback message for an HTTP status, used when the
    /// error body carries no message of its own.
    pub fn message_for_status(status: u16) -> &'static str {
        match status {
            400 => "bad request - please check your input",
            401 => "unauthorized - please check your API credentials",
            403 => "forbidden - you don't have permission for this action",
            404 => "resource not found",
            422 => "validation failed - please check your input",
            429 => "too many requests - please try again later",
            500 => "server error - please try again later",
            503 => "service unavailable - please try again later",
            _ => "an error occurred",
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_and_timeout_classify_as_network_errors() {
        let network = ApiError::Network {
            message: "connection refused".into(),
        };
        let timeout = ApiError::Timeout { seconds: 30 };

        assert!(network.is_network_error());
        assert!(timeout.is_network_error());
        assert!(network.is_retryable());
        assert!(timeout.is_retryable());
        assert!(!network.is_client_error());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let not_found = ApiError::NotFound {
            resource: "bill 42".into(),
        };
        let rejected = ApiError::Client {
            status: 422,
            message: "validation failed".into(),
        };
        let invalid = ApiError::validation("limit must be positive");

        assert!(not_found.is_client_error());
        assert!(rejected.is_client_error());
        assert!(!not_found.is_retryable());
        assert!(!rejected.is_retryable());
        assert!(!invalid.is_retryable());
    }

    #[test]
    fn should_retry_respects_attempt_budget() {
        let server = ApiError::Server {
            status: 503,
            message: "unavailable".into(),
        };

        assert!(server.should_retry(0, 3));
        assert!(server.should_retry(2, 3));
        assert!(!server.should_retry(3, 3));

        let bad_request = ApiError::Client {
            status: 400,
            message: "bad request".into(),
        };
        assert!(!bad_request.should_retry(0, 3));
    }

    #[test]
    fn status_messages_match_known_codes() {
        assert_eq!(ApiError::message_for_status(404), "resource not found");
        assert_eq!(
            ApiError::message_for_status(429),
            "too many requests - please try again later"
        );
        assert_eq!(ApiError::message_for_status(418), "an error occurred");
    }
}
