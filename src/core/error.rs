//! Error types for the log sink

pub type Result<T> = std::result::Result<T, SinkError>;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Endpoint answered with a non-2xx status
    #[error("Log delivery to '{endpoint}' failed with HTTP status {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Connect or request budget exceeded
    #[error("Log delivery to '{endpoint}' timed out: {message}")]
    Timeout { endpoint: String, message: String },

    /// Network-level failure (DNS, refused connection, TLS, bad URL)
    #[error("Log delivery to '{endpoint}' failed: {message}")]
    Network { endpoint: String, message: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SinkError {
    /// Create an HTTP status error
    pub fn http_status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        SinkError::HttpStatus {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Timeout {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        SinkError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an IO error with the operation that failed
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        SinkError::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SinkError::Other(msg.into())
    }

    /// Whether this error means a batch could not be delivered
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            SinkError::HttpStatus { .. } | SinkError::Timeout { .. } | SinkError::Network { .. }
        )
    }

    /// HTTP status carried by the error, if the endpoint answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            SinkError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
