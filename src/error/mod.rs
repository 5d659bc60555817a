use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Discourse graph errors. All recoverable: the store rejects the
/// operation, reports to the user, and leaves the graph unchanged.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Unknown parent node: {parent_id}")]
    UnknownParent { parent_id: String },

    #[error("Thread mismatch: parent belongs to {parent_thread}, reply targeted {thread_id}")]
    ThreadMismatch {
        parent_thread: String,
        thread_id: String,
    },

    #[error("Unknown node: {node_id}")]
    UnknownNode { node_id: String },

    #[error("Thread {thread_id} already has a root claim")]
    DuplicateRoot { thread_id: String },

    #[error("Graph inconsistency: {message}")]
    Inconsistent { message: String },
}

/// Generative-text oracle errors
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Chat-platform transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Snapshot persistence errors
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for oracle operations
pub type OracleResult<T> = Result<T, OracleError>;

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type alias for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config {
            message: "missing key".to_string(),
        };
        assert_eq!(err.to_string(), "Configuration error: missing key");

        let err = AppError::Internal {
            message: "unexpected".to_string(),
        };
        assert_eq!(err.to_string(), "Internal error: unexpected");
    }

    #[test]
    fn test_graph_error_display() {
        let err = GraphError::UnknownParent {
            parent_id: "msg-42".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown parent node: msg-42");

        let err = GraphError::ThreadMismatch {
            parent_thread: "T1".to_string(),
            thread_id: "T2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Thread mismatch: parent belongs to T1, reply targeted T2"
        );

        let err = GraphError::UnknownNode {
            node_id: "msg-7".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown node: msg-7");

        let err = GraphError::DuplicateRoot {
            thread_id: "T1".to_string(),
        };
        assert_eq!(err.to_string(), "Thread T1 already has a root claim");
    }

    #[test]
    fn test_oracle_error_display() {
        let err = OracleError::Unavailable {
            message: "server down".to_string(),
            retries: 3,
        };
        assert_eq!(
            err.to_string(),
            "Oracle unavailable: server down (retries: 3)"
        );

        let err = OracleError::Api {
            status: 401,
            message: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - unauthorized");

        let err = OracleError::Timeout { timeout_ms: 5000 };
        assert_eq!(err.to_string(), "Request timeout after 5000ms");
    }

    #[test]
    fn test_snapshot_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SnapshotError = io_err.into();
        assert!(matches!(err, SnapshotError::Io { .. }));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_graph_error_conversion_to_app_error() {
        let graph_err = GraphError::DuplicateRoot {
            thread_id: "T9".to_string(),
        };
        let app_err: AppError = graph_err.into();
        assert!(matches!(app_err, AppError::Graph(_)));
        assert!(app_err.to_string().contains("already has a root"));
    }

    #[test]
    fn test_oracle_error_conversion_to_app_error() {
        let oracle_err = OracleError::Timeout { timeout_ms: 1000 };
        let app_err: AppError = oracle_err.into();
        assert!(matches!(app_err, AppError::Oracle(_)));
    }

    #[test]
    fn test_transport_error_conversion_to_app_error() {
        let transport_err = TransportError::Api {
            status: 403,
            message: "missing permissions".to_string(),
        };
        let app_err: AppError = transport_err.into();
        assert!(matches!(app_err, AppError::Transport(_)));
        assert!(app_err.to_string().contains("403"));
    }
}
