//! Handler trait for additional log destinations
//!
//! Handlers are notified synchronously, in registration order, on the calling
//! thread and while the logger's lock is held. A slow handler therefore delays
//! every later log call from every thread; handlers should bound their own
//! latency. Handler code must not log through the logger that is notifying it.

use std::fmt;

use super::config::LoggerSettings;
use super::error::{LoggerError, Result};
use super::field::Fields;
use super::log_level::LogLevel;

/// How a log call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Operands joined like `Sprint`.
    Print,
    /// A format string with arguments.
    Printf,
    /// Operands space-joined with a trailing newline.
    Println,
    /// A message followed by key/value pairs.
    PrintStructured,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Print => "print",
            Shape::Printf => "printf",
            Shape::Println => "println",
            Shape::PrintStructured => "printw",
        }
    }
}

pub trait Handler: Send + Sync {
    fn notify(
        &self,
        shape: Shape,
        logger: &LoggerSettings,
        level: LogLevel,
        fields: &Fields,
    ) -> Result<()>;

    fn name(&self) -> &str;
}

/// What the logger does with handler failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HandlerErrorPolicy {
    /// Report the failure on stderr, count it in metrics and move on.
    #[default]
    Discard,
    /// Keep every failure until drained with `take_handler_errors`.
    Collect,
    /// Stop dispatching at the first failure and return it from `emit`.
    PropagateFirst,
}

/// A failure reported by (or a panic raised in) one handler.
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: String,
    pub level: LogLevel,
    pub error: LoggerError,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} handler '{}': {}", self.level, self.handler, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::{Field, Value};
    use parking_lot::Mutex;

    struct Recording {
        seen: Mutex<Vec<(Shape, LogLevel, String)>>,
    }

    impl Handler for Recording {
        fn notify(
            &self,
            shape: Shape,
            _logger: &LoggerSettings,
            level: LogLevel,
            fields: &Fields,
        ) -> Result<()> {
            self.seen
                .lock()
                .push((shape, level, fields.message().to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[test]
    fn test_handler_is_object_safe() {
        let handler: Box<dyn Handler> = Box::new(Recording {
            seen: Mutex::new(Vec::new()),
        });
        let fields = Fields::new(
            vec![Field::new("level", Value::display("INFO"))],
            "hello",
            vec![],
        );

        handler
            .notify(Shape::Print, &LoggerSettings::default(), LogLevel::Info, &fields)
            .unwrap();
        assert_eq!(handler.name(), "recording");
    }

    #[test]
    fn test_failure_display() {
        let failure = HandlerFailure {
            handler: "webhook".to_string(),
            level: LogLevel::Error,
            error: LoggerError::transport("http://localhost", "HTTP 500"),
        };
        assert_eq!(
            failure.to_string(),
            "ERROR handler 'webhook': Transport to 'http://localhost' failed: HTTP 500"
        );
    }

    #[test]
    fn test_default_policy_is_discard() {
        assert_eq!(HandlerErrorPolicy::default(), HandlerErrorPolicy::Discard);
    }
}
