use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExploitDbError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend could not be reached or refused the operation (connection refused, lock contention).
    #[error("Connection error: backend={backend}, target={target}: {message}")]
    Connection {
        backend: String,
        target: String,
        message: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Operation not supported: {operation} is not available for the {backend} backend")]
    Unsupported {
        operation: &'static str,
        backend: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    /// The remote refused the request for quota reasons. `retry_after` is the
    /// wait the server announced, when it announced one.
    #[error("Rate limited: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<std::time::Duration>,
    },

    /// A response arrived but could not be interpreted (e.g. a malformed header).
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExploitDbError {
    pub fn connection(backend: &str, target: &str, message: impl Into<String>) -> Self {
        ExploitDbError::Connection {
            backend: backend.to_string(),
            target: target.to_string(),
            message: message.into(),
        }
    }

    pub fn unsupported(operation: &'static str, backend: &str) -> Self {
        ExploitDbError::Unsupported {
            operation,
            backend: backend.to_string(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, ExploitDbError::Unsupported { .. })
    }
}
