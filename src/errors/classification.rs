use super::types::ExploitDbError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl ExploitDbError {
    /// Classify this error to determine its type and whether a caller may retry it.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transient: the caller may try again later
            ExploitDbError::Connection { .. } => ErrorClassification {
                error_type: "ConnectionError",
                retryable: true,
            },
            ExploitDbError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            ExploitDbError::RateLimit { .. } => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            ExploitDbError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: true,
            },

            // Fatal or data-dependent: retrying yields the same result
            ExploitDbError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            ExploitDbError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                retryable: false,
            },
            ExploitDbError::InvalidResponse(_) => ErrorClassification {
                error_type: "InvalidResponseError",
                retryable: false,
            },
            ExploitDbError::Serialization(_) => ErrorClassification {
                error_type: "SerializationError",
                retryable: false,
            },
            ExploitDbError::Unsupported { .. } => ErrorClassification {
                error_type: "UnsupportedError",
                retryable: false,
            },
            ExploitDbError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            ExploitDbError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            ExploitDbError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_connection_is_retryable() {
        let err = ExploitDbError::connection("sqlite3", "/tmp/x.sqlite3", "database is locked");
        let class = err.classify();
        assert_eq!(class.error_type, "ConnectionError");
        assert!(class.retryable);
    }

    #[test]
    fn test_classify_config_is_fatal() {
        let class = ExploitDbError::Config("unknown backend".into()).classify();
        assert_eq!(class.error_type, "ConfigError");
        assert!(!class.retryable);
    }

    #[test]
    fn test_classify_invalid_response_is_fatal() {
        let class = ExploitDbError::InvalidResponse("bad header".into()).classify();
        assert_eq!(class.error_type, "InvalidResponseError");
        assert!(!class.retryable);
    }

    #[test]
    fn test_classify_unsupported_is_distinct() {
        let err = ExploitDbError::unsupported("get_exploit_all", "redis");
        assert!(err.is_unsupported());
        let class = err.classify();
        assert_eq!(class.error_type, "UnsupportedError");
        assert!(!class.retryable);
    }

    #[test]
    fn test_connection_error_message_carries_context() {
        let err = ExploitDbError::connection("redis", "redis://localhost:6379/0", "refused");
        let msg = err.to_string();
        assert!(msg.contains("redis://localhost:6379/0"));
        assert!(msg.contains("backend=redis"));
    }
}
