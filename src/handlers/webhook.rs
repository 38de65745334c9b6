//! Chat webhook handler
//!
//! Builds a Slack-compatible incoming-webhook payload from each call's
//! [`Fields`] and hands it to a [`WebhookTransport`]. Plain shapes send one
//! `text` line; the structured shape sends the message as `text` and every
//! other field as a `*Key*: value` attachment field.
//!
//! The handler runs inside the logger's critical section, so the HTTP
//! transport uses a short request timeout.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::{
    keys, Fields, Handler, LogLevel, LoggerError, LoggerSettings, Result, Shape,
};

/// Base URL of Slack incoming webhooks; the token is appended.
pub const SLACK_WEBHOOK_BASE_URL: &str = "https://hooks.slack.com/services/";

/// Request timeout of [`HttpTransport`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Attachment color for a level.
pub fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Fatal => "#cc0000",
        LogLevel::Error => "danger",
        LogLevel::Warn => "warning",
        LogLevel::Info => "good",
        LogLevel::Debug => "#7e7e7c",
        LogLevel::None => "",
    }
}

/// Destination and presentation of webhook posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub url: String,
    pub username: String,
    pub icon_emoji: String,
    pub icon_url: String,
    pub channel: String,
    /// Attachment title; omitted when empty.
    pub title: String,
    /// The handler's own threshold, checked on every call.
    pub verbosity: LogLevel,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            icon_emoji: String::new(),
            icon_url: String::new(),
            channel: String::new(),
            title: String::new(),
            verbosity: LogLevel::Debug,
        }
    }
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Post to the Slack incoming webhook identified by `token`
    /// (the `T000/B000/XXXX` part of the hook URL).
    pub fn slack(token: &str) -> Self {
        Self::new(format!("{}{}", SLACK_WEBHOOK_BASE_URL, token))
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_icon_emoji(mut self, icon_emoji: impl Into<String>) -> Self {
        self.icon_emoji = icon_emoji.into();
        self
    }

    #[must_use]
    pub fn with_icon_url(mut self, icon_url: impl Into<String>) -> Self {
        self.icon_url = icon_url.into();
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_verbosity(mut self, verbosity: LogLevel) -> Self {
        self.verbosity = verbosity;
        self
    }
}

/// Incoming-webhook payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_emoji: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub channel: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(default)]
    pub mrkdwn_in: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub short: bool,
}

impl AttachmentField {
    /// `*Key*: value`
    fn labeled(key: &str, value: &str) -> Self {
        Self {
            title: String::new(),
            value: format!("*{}*: {}", title_case(key), value),
            short: false,
        }
    }
}

/// Upper-case the first letter of every word; `_` does not split words.
fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Delivers a payload to a webhook URL.
pub trait WebhookTransport: Send + Sync {
    fn post(&self, url: &str, message: &WebhookMessage) -> Result<()>;
}

/// Blocking HTTP POST with a JSON body.
#[cfg(feature = "webhook-http")]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "webhook-http")]
impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoggerError::config("HttpTransport", e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "webhook-http")]
impl WebhookTransport for HttpTransport {
    fn post(&self, url: &str, message: &WebhookMessage) -> Result<()> {
        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .map_err(|e| LoggerError::transport(url, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LoggerError::transport(url, format!("HTTP {}", status)))
        }
    }
}

/// Keeps every posted payload in memory; clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    posted: Arc<Mutex<Vec<(String, WebhookMessage)>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(url, payload)` posted so far, oldest first.
    pub fn posted(&self) -> Vec<(String, WebhookMessage)> {
        self.posted.lock().clone()
    }

    pub fn last(&self) -> Option<WebhookMessage> {
        self.posted.lock().last().map(|(_, message)| message.clone())
    }

    pub fn len(&self) -> usize {
        self.posted.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posted.lock().is_empty()
    }
}

impl WebhookTransport for RecordingTransport {
    fn post(&self, url: &str, message: &WebhookMessage) -> Result<()> {
        self.posted.lock().push((url.to_string(), message.clone()));
        Ok(())
    }
}

/// Posts log calls to a chat webhook
///
/// # Example
///
/// ```
/// use rust_leveled_logger::prelude::*;
/// use rust_leveled_logger::handlers::{RecordingTransport, WebhookConfig, WebhookHandler};
///
/// let transport = RecordingTransport::new();
/// let logger = Logger::builder()
///     .output(BufferWriter::new())
///     .handler(WebhookHandler::new(
///         WebhookConfig::slack("T000/B000/XXXX").with_channel("#alerts"),
///         transport.clone(),
///     ))
///     .build();
///
/// logger.info(values!["This is ", "info log"]);
///
/// let attachment = &transport.last().unwrap().attachments[0];
/// assert_eq!(attachment.color, "good");
/// assert_eq!(attachment.text, "*INFO*: This is info log");
/// ```
pub struct WebhookHandler {
    config: WebhookConfig,
    transport: Box<dyn WebhookTransport>,
    /// Serializes build-and-post when one handler serves several loggers.
    guard: Mutex<()>,
}

impl WebhookHandler {
    pub fn new(config: WebhookConfig, transport: impl WebhookTransport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            guard: Mutex::new(()),
        }
    }

    /// Handler posting over HTTP with [`DEFAULT_TIMEOUT`].
    #[cfg(feature = "webhook-http")]
    pub fn http(config: WebhookConfig) -> Result<Self> {
        Ok(Self::new(config, HttpTransport::new()?))
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// The payload for one call.
    pub fn build_message(
        &self,
        shape: Shape,
        full_structured: bool,
        level: LogLevel,
        fields: &Fields,
    ) -> WebhookMessage {
        let mut attachment = Attachment {
            color: level_color(level).to_string(),
            title: self.config.title.clone(),
            mrkdwn_in: vec!["text".to_string(), "fields".to_string()],
            ..Attachment::default()
        };

        match shape {
            Shape::Print | Shape::Printf | Shape::Println => {
                let mut text = String::new();
                for field in &fields.prefix {
                    if field.key == keys::LEVEL {
                        text.push_str(&format!("*{}*:", field.value));
                    } else {
                        text.push_str(field.value.as_str());
                    }
                    text.push(' ');
                }
                text.push_str(fields.message_line());
                attachment.text = text;
            }
            Shape::PrintStructured => {
                for field in &fields.payload {
                    if field.key == keys::MESSAGE && !full_structured {
                        attachment.text = fields.message_line().to_string();
                    } else {
                        attachment
                            .fields
                            .push(AttachmentField::labeled(&field.key, field.value.as_str()));
                    }
                }
                attachment.fields.extend(
                    fields
                        .prefix
                        .iter()
                        .map(|f| AttachmentField::labeled(&f.key, f.value.as_str())),
                );
            }
        }

        WebhookMessage {
            username: self.config.username.clone(),
            icon_emoji: self.config.icon_emoji.clone(),
            icon_url: self.config.icon_url.clone(),
            channel: self.config.channel.clone(),
            attachments: vec![attachment],
        }
    }
}

impl Handler for WebhookHandler {
    fn notify(
        &self,
        shape: Shape,
        logger: &LoggerSettings,
        level: LogLevel,
        fields: &Fields,
    ) -> Result<()> {
        let _guard = self.guard.lock();

        if !level.is_enabled_at(self.config.verbosity) {
            return Ok(());
        }

        let message = self.build_message(shape, logger.is_full_structured(), level, fields);
        self.transport.post(&self.config.url, &message)
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("config", &self.config)
            .finish()
    }
}
