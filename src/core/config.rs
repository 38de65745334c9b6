//! Logger configuration
//!
//! [`Flags`] selects which prefix fields are captured and whether prefix
//! fields are rendered as explicit `key=value` pairs. [`LoggerConfig`] is a
//! serializable snapshot of every option and can seed a
//! [`LoggerBuilder`](super::logger::LoggerBuilder).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;

/// Output flags, combinable with `|`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Capture and render the `ts` field.
    pub const TIMESTAMP: Flags = Flags(1);
    /// Capture and render the `caller` field.
    pub const CALLER: Flags = Flags(1 << 1);
    /// Render every field, prefix included, as `key=value`.
    pub const FULL_STRUCTURED: Flags = Flags(1 << 2);

    const ALL: u8 = 0b111;

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Unknown bits are dropped.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Flags(bits & Self::ALL)
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Flags::TIMESTAMP) {
            names.push("TIMESTAMP");
        }
        if self.contains(Flags::CALLER) {
            names.push("CALLER");
        }
        if self.contains(Flags::FULL_STRUCTURED) {
            names.push("FULL_STRUCTURED");
        }
        if names.is_empty() {
            write!(f, "Flags(NONE)")
        } else {
            write!(f, "Flags({})", names.join(" | "))
        }
    }
}

/// The logger-wide settings handed to handlers with every call.
///
/// Handlers run while the logger is locked, so they read configuration from
/// this snapshot instead of calling back into the logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerSettings {
    pub verbosity: LogLevel,
    pub flags: Flags,
    pub timestamp_format: TimestampFormat,
    pub format_enabled: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            verbosity: LogLevel::default(),
            flags: Flags::NONE,
            timestamp_format: TimestampFormat::default(),
            format_enabled: true,
        }
    }
}

impl LoggerSettings {
    pub fn is_full_structured(&self) -> bool {
        self.flags.contains(Flags::FULL_STRUCTURED)
    }
}

/// Serializable logger options
///
/// # Example
///
/// ```
/// use rust_leveled_logger::core::LoggerConfig;
///
/// let config = LoggerConfig::from_json(
///     r#"{"verbosity":"debug","timestamp":true,"time_format":"%H:%M:%S"}"#,
/// ).unwrap();
/// let logger = config.builder().unwrap().build();
/// assert_eq!(logger.verbosity(), rust_leveled_logger::LogLevel::Debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Level name, e.g. `"info"`.
    pub verbosity: String,
    pub timestamp: bool,
    pub caller: bool,
    pub full_structured: bool,
    /// strftime pattern; the ISO 8601 default applies when absent.
    pub time_format: Option<String>,
    /// When false, only the raw message is written.
    pub format_enabled: bool,
    pub color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            verbosity: LogLevel::default().to_str().to_lowercase(),
            timestamp: false,
            caller: false,
            full_structured: false,
            time_format: None,
            format_enabled: true,
            color: true,
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn verbosity(&self) -> Result<LogLevel> {
        self.verbosity.parse()
    }

    pub fn flags(&self) -> Flags {
        let mut flags = Flags::NONE;
        if self.timestamp {
            flags |= Flags::TIMESTAMP;
        }
        if self.caller {
            flags |= Flags::CALLER;
        }
        if self.full_structured {
            flags |= Flags::FULL_STRUCTURED;
        }
        flags
    }

    pub fn timestamp_format(&self) -> Result<TimestampFormat> {
        match &self.time_format {
            None => Ok(TimestampFormat::default()),
            Some(pattern) if pattern.trim().is_empty() => Err(LoggerError::config(
                "LoggerConfig",
                "time_format must not be empty",
            )),
            Some(pattern) => Ok(TimestampFormat::Custom(pattern.clone())),
        }
    }

    /// A builder pre-populated with these options.
    pub fn builder(&self) -> Result<super::logger::LoggerBuilder> {
        Ok(super::logger::LoggerBuilder::new()
            .verbosity(self.verbosity()?)
            .flags(self.flags())
            .timestamp_format(self.timestamp_format()?)
            .format_enabled(self.format_enabled)
            .color(self.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_combine() {
        let flags = Flags::TIMESTAMP | Flags::CALLER;
        assert!(flags.contains(Flags::TIMESTAMP));
        assert!(flags.contains(Flags::CALLER));
        assert!(!flags.contains(Flags::FULL_STRUCTURED));
        assert_eq!(flags.bits(), 0b011);
    }

    #[test]
    fn test_flags_truncate() {
        assert_eq!(Flags::from_bits_truncate(0xff).bits(), 0b111);
        assert!(Flags::from_bits_truncate(0b1000).is_empty());
    }

    #[test]
    fn test_flags_debug() {
        assert_eq!(format!("{:?}", Flags::NONE), "Flags(NONE)");
        assert_eq!(
            format!("{:?}", Flags::TIMESTAMP | Flags::FULL_STRUCTURED),
            "Flags(TIMESTAMP | FULL_STRUCTURED)"
        );
    }

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.verbosity().unwrap(), LogLevel::Info);
        assert!(config.flags().is_empty());
        assert!(config.format_enabled);
        assert!(config.color);
        assert_eq!(config.timestamp_format().unwrap(), TimestampFormat::Iso8601);
    }

    #[test]
    fn test_from_json() {
        let config = LoggerConfig::from_json(
            r#"{"verbosity":"warn","caller":true,"full_structured":true,"color":false}"#,
        )
        .unwrap();

        assert_eq!(config.verbosity().unwrap(), LogLevel::Warn);
        assert_eq!(config.flags(), Flags::CALLER | Flags::FULL_STRUCTURED);
        assert!(!config.color);
        assert!(config.format_enabled);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = LoggerConfig::from_json(r#"{"verbose":5}"#);
        assert!(matches!(result, Err(LoggerError::JsonError(_))));
    }

    #[test]
    fn test_invalid_level() {
        let config = LoggerConfig {
            verbosity: "chatty".to_string(),
            ..LoggerConfig::default()
        };
        assert!(matches!(config.verbosity(), Err(LoggerError::InvalidLevel(_))));
        assert!(config.builder().is_err());
    }

    #[test]
    fn test_empty_time_format_rejected() {
        let config = LoggerConfig {
            time_format: Some("  ".to_string()),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            config.timestamp_format(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}
