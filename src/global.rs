//! Process-wide default logger
//!
//! The default logger is created once, either explicitly with [`init`] or on
//! first use with the default configuration, and lives for the rest of the
//! process. The free functions below forward to it.
//!
//! # Examples
//!
//! ```
//! use rust_leveled_logger::global;
//! use rust_leveled_logger::prelude::*;
//!
//! let buffer = BufferWriter::new();
//! let logger = global::init(Logger::builder().output(buffer.clone()).color(false));
//!
//! global::warnw("disk usage", values!["percent", 91]);
//! assert!(buffer.contents().contains("WARN:  disk usage percent=91"));
//!
//! // Later calls to `init` keep the first logger.
//! let again = global::init(Logger::builder());
//! assert!(std::ptr::eq(logger, again));
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::{
    CallSite, Flags, Handler, HandlerErrorPolicy, HandlerFailure, LogLevel, Logger, LoggerBuilder,
    Message, Target, Value,
};

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Install the default logger built from `builder`.
///
/// Idempotent: when a default logger already exists it is returned unchanged
/// and `builder` is dropped.
pub fn init(builder: LoggerBuilder) -> &'static Logger {
    DEFAULT_LOGGER.get_or_init(|| builder.build())
}

/// Whether the default logger has been created.
pub fn is_initialized() -> bool {
    DEFAULT_LOGGER.get().is_some()
}

/// The default logger, created with the default configuration if needed.
pub fn default_logger() -> &'static Logger {
    DEFAULT_LOGGER.get_or_init(Logger::new)
}

/// Log at an explicit call site through the default logger.
pub fn log_at(site: CallSite, level: LogLevel, message: Message<'_>) {
    default_logger().log_at(site, level, message);
}

pub fn set_verbosity(verbosity: LogLevel) {
    default_logger().set_verbosity(verbosity);
}

pub fn set_verbosity_raw(verbosity: i64) {
    default_logger().set_verbosity_raw(verbosity);
}

pub fn verbosity() -> LogLevel {
    default_logger().verbosity()
}

pub fn set_output(target: impl Into<Target>) {
    default_logger().set_output(target);
}

pub fn set_level_output(level: LogLevel, target: impl Into<Target>) {
    default_logger().set_level_output(level, target);
}

pub fn set_flags(flags: Flags) {
    default_logger().set_flags(flags);
}

pub fn flags() -> Flags {
    default_logger().flags()
}

pub fn set_time_format(pattern: impl Into<String>) {
    default_logger().set_time_format(pattern);
}

pub fn enable_log_format() {
    default_logger().enable_log_format();
}

pub fn disable_log_format() {
    default_logger().disable_log_format();
}

pub fn enable_color() {
    default_logger().enable_color();
}

pub fn disable_color() {
    default_logger().disable_color();
}

pub fn enable_level_color(level: LogLevel) {
    default_logger().enable_level_color(level);
}

pub fn disable_level_color(level: LogLevel) {
    default_logger().disable_level_color(level);
}

pub fn add_handler(handler: Arc<dyn Handler>) {
    default_logger().add_handler(handler);
}

pub fn set_error_policy(policy: HandlerErrorPolicy) {
    default_logger().set_error_policy(policy);
}

pub fn take_handler_errors() -> Vec<HandlerFailure> {
    default_logger().take_handler_errors()
}

macro_rules! level_functions {
    ($level:expr, $print:ident, $printf:ident, $println:ident, $printw:ident) => {
        #[track_caller]
        pub fn $print(values: impl AsRef<[Value]>) {
            default_logger().print($level, values);
        }

        #[track_caller]
        pub fn $printf(args: fmt::Arguments<'_>) {
            default_logger().printf($level, args);
        }

        #[track_caller]
        pub fn $println(values: impl AsRef<[Value]>) {
            default_logger().println($level, values);
        }

        #[track_caller]
        pub fn $printw(msg: impl Into<Value>, key_values: impl AsRef<[Value]>) {
            default_logger().printw($level, msg, key_values);
        }
    };
}

level_functions!(LogLevel::Debug, debug, debugf, debugln, debugw);
level_functions!(LogLevel::Info, info, infof, infoln, infow);
level_functions!(LogLevel::Warn, warn, warnf, warnln, warnw);
level_functions!(LogLevel::Error, error, errorf, errorln, errorw);
level_functions!(LogLevel::Fatal, fatal, fatalf, fatalln, fatalw);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_logger_is_shared() {
        let first = default_logger();
        let second = init(Logger::builder().verbosity(LogLevel::Debug));
        assert!(std::ptr::eq(first, second));
        assert!(is_initialized());
    }
}
