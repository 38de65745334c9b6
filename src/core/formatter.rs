//! Rendering of [`Fields`] into output lines
//!
//! Three modes:
//! - Plain: `[ts ][caller ]LEVEL:  message key=value ...`, level column padded,
//!   a value quoted only when it contains whitespace
//! - FullyStructured: `ts=.. caller=.. level=INFO msg="message" key=value ...`
//! - Unformatted: the message text only, uncolored
//!
//! Every rendered line ends with exactly one `\n`; a message's own trailing
//! newline is not doubled.

use colored::Colorize;

use super::config::Flags;
use super::field::{keys, Fields, Value};
use super::log_level::LogLevel;

/// Width of the `LEVEL:` column in plain mode.
pub const LEVEL_COLUMN_WIDTH: usize = 7;

/// Rendering mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Human-readable line with a padded level column (default)
    ///
    /// Example: `main.rs:12:main INFO:  Request processed user=alice note="two words"`
    #[default]
    Plain,

    /// Every field as `key=value`
    ///
    /// Example: `ts=2025-01-08T10:30:45.123Z level=INFO msg="Request processed"`
    FullyStructured,

    /// Raw message text
    Unformatted,
}

impl RenderMode {
    /// Pick the mode for a logger's format toggle and flags.
    pub fn select(format_enabled: bool, flags: Flags) -> Self {
        if !format_enabled {
            RenderMode::Unformatted
        } else if flags.contains(Flags::FULL_STRUCTURED) {
            RenderMode::FullyStructured
        } else {
            RenderMode::Plain
        }
    }

    pub fn render(&self, fields: &Fields, level: LogLevel, color: bool) -> String {
        match self {
            RenderMode::Plain => render_plain(fields, level, color),
            RenderMode::FullyStructured => render_structured(fields, level, color),
            RenderMode::Unformatted => render_unformatted(fields),
        }
    }
}

/// `[ts ][caller ]LEVEL:` padded to [`LEVEL_COLUMN_WIDTH`].
pub fn render_prefix(fields: &Fields, level: LogLevel, color: bool) -> String {
    let mut out = String::new();
    for field in fields.prefix.iter().filter(|f| f.key != keys::LEVEL) {
        out.push_str(field.value.as_str());
        out.push(' ');
    }

    let label = format!(
        "{:<width$}",
        format!("{}:", level.to_str()),
        width = LEVEL_COLUMN_WIDTH
    );
    out.push_str(&emphasize(&label, level, color, true));
    out
}

fn render_plain(fields: &Fields, level: LogLevel, color: bool) -> String {
    let mut out = render_prefix(fields, level, color);
    out.push_str(&emphasize(fields.message_line(), level, color, false));

    for field in fields.extras() {
        out.push(' ');
        out.push_str(&emphasize(&field.key, level, color, false));
        out.push('=');
        out.push_str(&field.value.render_plain());
    }

    out.push('\n');
    out
}

fn render_structured(fields: &Fields, level: LogLevel, color: bool) -> String {
    let pair = |key: &str, value: &Value| {
        format!(
            "{}={}",
            emphasize(key, level, color, false),
            value.render_logfmt()
        )
    };

    let mut parts: Vec<String> = fields
        .prefix
        .iter()
        .map(|f| pair(&f.key, &f.value))
        .collect();

    if let Some((message, extras)) = fields.payload.split_first() {
        let text = Value::Text(fields.message_line().to_string());
        parts.push(pair(&message.key, &text));
        parts.extend(extras.iter().map(|f| pair(&f.key, &f.value)));
    }

    let mut out = parts.join(" ");
    out.push('\n');
    out
}

fn render_unformatted(fields: &Fields) -> String {
    let mut out = fields.message_line().to_string();
    out.push('\n');
    out
}

/// Colorize `text` with the level's color.
pub fn emphasize(text: &str, level: LogLevel, color: bool, bold: bool) -> String {
    match level.color_code() {
        Some(code) if color => {
            let styled = text.color(code);
            if bold {
                styled.bold().to_string()
            } else {
                styled.to_string()
            }
        }
        _ => text.to_string(),
    }
}
