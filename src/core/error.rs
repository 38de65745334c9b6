//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Unknown level name
    #[error("Invalid log level: '{0}'")]
    InvalidLevel(String),

    /// A handler rejected or failed to process a log call
    #[error("Handler '{handler}' failed: {message}")]
    Handler { handler: String, message: String },

    /// A remote sink could not be reached or answered with an error
    #[error("Transport to '{endpoint}' failed: {message}")]
    Transport { endpoint: String, message: String },
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a handler error
    pub fn handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Handler {
            handler: handler.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Transport {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("LoggerConfig", "unknown level");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::handler("webhook", "connection refused");
        assert!(matches!(err, LoggerError::Handler { .. }));

        let err = LoggerError::transport("https://hooks.example.com", "HTTP 500");
        assert!(matches!(err, LoggerError::Transport { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::handler("webhook", "connection refused");
        assert_eq!(err.to_string(), "Handler 'webhook' failed: connection refused");

        let err = LoggerError::transport("http://127.0.0.1:9", "HTTP 404");
        assert_eq!(
            err.to_string(),
            "Transport to 'http://127.0.0.1:9' failed: HTTP 404"
        );

        let err = LoggerError::InvalidLevel("verbose".to_string());
        assert_eq!(err.to_string(), "Invalid log level: 'verbose'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: LoggerError = io_err.into();

        assert!(matches!(err, LoggerError::IoError(_)));
        assert!(err.to_string().contains("pipe closed"));
    }
}
