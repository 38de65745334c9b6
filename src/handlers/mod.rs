//! Handler implementations

pub mod json;
pub mod webhook;

pub use json::JsonLinesHandler;
#[cfg(feature = "webhook-http")]
pub use webhook::HttpTransport;
pub use webhook::{
    Attachment, AttachmentField, RecordingTransport, WebhookConfig, WebhookHandler,
    WebhookMessage, WebhookTransport,
};

// Re-export the trait for implementors
pub use crate::core::Handler;
