//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod error;
pub mod field;
pub mod formatter;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output;
pub mod timestamp;

pub use caller::{
    CallSite, CallerResolver, FullCallerResolver, ShortCallerResolver, UNKNOWN_FUNCTION,
};
pub use config::{Flags, LoggerConfig, LoggerSettings};
pub use error::{LoggerError, Result};
pub use field::{keys, Field, Fields, Value};
pub use formatter::{RenderMode, LEVEL_COLUMN_WIDTH};
pub use handler::{Handler, HandlerErrorPolicy, HandlerFailure, Shape};
pub use log_level::LogLevel;
pub use logger::{FatalHook, Logger, LoggerBuilder, Message, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use output::{BufferWriter, Target};
pub use timestamp::{Clock, FixedClock, SystemClock, TimestampFormat};
