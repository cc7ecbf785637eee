//! Error types for the domain logger

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Malformed domain name, missing filename prefix or bad configuration attribute
    #[error("Invalid configuration for {component}: {message}")]
    Configuration { component: String, message: String },

    /// Source path is not below any configured path prefix
    #[error(
        "Source path '{path}' is not below any configured path prefix \
         (add its root to LOG_DOMAIN_PATH_PREFIXES)"
    )]
    PathNotConfigured { path: String },

    /// Sink could not be built or opened
    #[error("Cannot construct sink '{sink}': {message}")]
    SinkConstruction { sink: String, message: String },

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration document could not be parsed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl LoggerError {
    /// Create a configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create an error for a source path outside every configured prefix
    pub fn path_not_configured(path: impl Into<String>) -> Self {
        LoggerError::PathNotConfigured { path: path.into() }
    }

    /// Create a sink construction error
    pub fn sink_construction(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkConstruction {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, LoggerError::Configuration { .. })
    }
}
