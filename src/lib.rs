//! # Rust Leveled Logger
//!
//! A leveled, structured logging core with synchronous, pluggable handlers.
//!
//! ## Features
//!
//! - **Severity gating**: `Fatal < Error < Warn < Info < Debug`, with `None`
//!   silencing everything
//! - **Four call shapes**: plain (`info`), printf (`infof`/`info!`), line
//!   (`infoln`) and structured key/value (`infow`/`infow!`)
//! - **Three renderings**: padded plain lines, fully structured `key=value`
//!   lines, or the raw message only
//! - **Handlers**: every emitted call is fanned out, in order and on the
//!   calling thread, to registered sinks such as a chat webhook
//! - **Thread Safe**: one lock per call keeps lines whole and handler
//!   snapshots identical to what was written
//!
//! ## Example
//!
//! ```
//! use rust_leveled_logger::prelude::*;
//!
//! let buffer = BufferWriter::new();
//! let logger = Logger::builder()
//!     .flags(Flags::CALLER | Flags::FULL_STRUCTURED)
//!     .output(buffer.clone())
//!     .color(false)
//!     .build();
//!
//! logger.warnw("msg text", values!["k1", "v1", "k2", 2.5]);
//! assert!(buffer.contents().contains(r#"level=WARN msg="msg text" k1="v1" k2=2.5"#));
//! ```

pub mod core;
pub mod global;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        BufferWriter, CallSite, Flags, Handler, HandlerErrorPolicy, LogLevel, Logger,
        LoggerBuilder, LoggerError, Message, Result, Shape, Target, TimestampFormat, Value,
    };
    pub use crate::values;
}

pub use crate::core::{
    BufferWriter, CallSite, CallerResolver, Clock, Field, Fields, Flags, Handler,
    HandlerErrorPolicy, HandlerFailure, LogLevel, Logger, LoggerBuilder, LoggerConfig,
    LoggerError, LoggerMetrics, LoggerSettings, Message, Result, Shape, Target, TimestampFormat,
    Value,
};
pub use handlers::{JsonLinesHandler, WebhookConfig, WebhookHandler};
