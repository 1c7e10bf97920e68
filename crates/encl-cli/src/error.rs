//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (connection refused, timeout, broken body).
    #[error("network error: {0}")]
    Network(String),

    /// Authentication or authorization failure (401/403).
    #[error("authentication error ({status}): {message}")]
    Auth {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Resource not found (404).
    #[error("{resource_type} not found: {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// Server-side failure (5xx).
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Any other unsuccessful API response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Malformed input detected before any request was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Some items of a batch could not be fetched (strict mode).
    #[error("{0}")]
    Batch(String),

    /// Operation cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

impl CliError {
    /// Returns true if the error implies every other request will fail too.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CliError::Auth { .. })
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        CliError::Network(e.to_string())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_auth_errors_are_fatal() {
        let auth = CliError::Auth {
            status: 401,
            message: "bad credentials".to_string(),
        };
        assert!(auth.is_fatal());

        let server = CliError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!server.is_fatal());
        assert!(!CliError::Validation("empty".to_string()).is_fatal());
        assert!(!CliError::Network("connection reset".to_string()).is_fatal());
        assert!(!CliError::NotFound {
            resource_type: "User".to_string(),
            id: "42".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn not_found_message_names_resource() {
        let err = CliError::NotFound {
            resource_type: "Role".to_string(),
            id: "admin".to_string(),
        };
        assert_eq!(err.to_string(), "Role not found: admin");
    }
}
