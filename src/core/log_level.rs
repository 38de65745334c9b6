//! Log level definitions
//!
//! Levels are ordered by verbosity: `None < Fatal < Error < Warn < Info < Debug`.
//! A logger's verbosity is itself a `LogLevel`; a call at level `L` is emitted
//! iff `L <= verbosity`, so `None` as a verbosity silences everything.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
#[derive(Default)]
pub enum LogLevel {
    None = 0,
    Fatal = 1,
    Error = 2,
    Warn = 3,
    #[default]
    Info = 4,
    Debug = 5,
}

impl LogLevel {
    /// Every level a call can be made at, most severe first.
    pub const EMITTING: [LogLevel; 5] = [
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::None => "NONE",
            LogLevel::Fatal => "FATAL",
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Build a level from a raw integer, clamping out-of-range values to
    /// `None` (below) or `Debug` (above).
    #[must_use]
    pub fn from_i64_clamped(value: i64) -> Self {
        match value {
            i64::MIN..=0 => LogLevel::None,
            1 => LogLevel::Fatal,
            2 => LogLevel::Error,
            3 => LogLevel::Warn,
            4 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    /// Whether a call at `self` passes a logger whose verbosity is `verbosity`.
    #[inline]
    #[must_use]
    pub fn is_enabled_at(self, verbosity: LogLevel) -> bool {
        self != LogLevel::None && self <= verbosity
    }

    /// Index into per-level tables; `None` has no slot.
    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        match self {
            LogLevel::None => None,
            other => Some(other as usize - 1),
        }
    }

    pub fn color_code(&self) -> Option<colored::Color> {
        use colored::Color::*;
        match self {
            LogLevel::None => None,
            LogLevel::Fatal => Some(BrightRed),
            LogLevel::Error => Some(Red),
            LogLevel::Warn => Some(Yellow),
            LogLevel::Info => Some(Green),
            LogLevel::Debug => Some(White),
        }
    }

    /// Fatal and Error go to stderr by default, everything else to stdout.
    #[must_use]
    pub fn uses_stderr_by_default(&self) -> bool {
        matches!(self, LogLevel::Fatal | LogLevel::Error)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" | "OFF" => Ok(LogLevel::None),
            "FATAL" => Ok(LogLevel::Fatal),
            "ERROR" => Ok(LogLevel::Error),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}
