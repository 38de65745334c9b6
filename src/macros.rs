//! Logging macros for ergonomic log calls.
//!
//! The printf-style macros (`debug!` .. `fatal!`) format through
//! `format_args!`, so nothing is allocated for calls the logger filters out.
//! The `*w!` macros take a message followed by a flat `key, value, ...` list.
//! Every macro records `module_path!()` with the call site, so the `caller`
//! field names the calling module.
//!
//! # Examples
//!
//! ```
//! use rust_leveled_logger::prelude::*;
//! use rust_leveled_logger::{info, warnw};
//!
//! let buffer = BufferWriter::new();
//! let logger = Logger::builder().output(buffer.clone()).color(false).build();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! warnw!(logger, "slow request", "path", "/health", "ms", 1250);
//!
//! assert_eq!(
//!     buffer.lines(),
//!     vec![
//!         "INFO:  Server listening on port 8080",
//!         "WARN:  slow request path=/health ms=1250",
//!     ]
//! );
//! ```

/// Build a `Vec<Value>` from heterogeneous operands.
///
/// ```
/// use rust_leveled_logger::{values, Value};
///
/// let args = values!["retries", 3, 2.5];
/// assert_eq!(args[0], Value::Text("retries".to_string()));
/// assert_eq!(args[1], Value::Scalar("3".to_string()));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {{
        let values: ::std::vec::Vec<$crate::Value> = ::std::vec![$($crate::Value::from($value)),*];
        values
    }};
}

/// The current source location, including the module path.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), line!(), column!(), Some(module_path!()))
    };
}

/// Log a printf-style message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::builder().output(BufferWriter::new()).build();
/// use rust_leveled_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_at(
            $crate::call_site!(),
            $level,
            $crate::Message::Printf(format_args!($($arg)+)),
        )
    };
}

/// Log a message and key/value pairs at an explicit level.
///
/// ```
/// # use rust_leveled_logger::prelude::*;
/// # let logger = Logger::builder().output(BufferWriter::new()).build();
/// use rust_leveled_logger::logw;
/// logw!(logger, LogLevel::Warn, "queue backlog", "depth", 512);
/// ```
#[macro_export]
macro_rules! logw {
    ($logger:expr, $level:expr, $msg:expr $(, $kv:expr)* $(,)?) => {
        $logger.log_at(
            $crate::call_site!(),
            $level,
            $crate::Message::Structured(
                $crate::Value::from($msg),
                &[$($crate::Value::from($kv)),*],
            ),
        )
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal message, then run the logger's fatal hook
/// (`std::process::exit(1)` unless replaced).
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[macro_export]
macro_rules! debugw {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logw!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! infow {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logw!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! warnw {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logw!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! errorw {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logw!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! fatalw {
    ($logger:expr, $($arg:tt)+) => {
        $crate::logw!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}
