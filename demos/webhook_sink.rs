//! Webhook handler example
//!
//! Builds chat webhook payloads for every call. Set `SLACK_WEBHOOK_TOKEN`
//! (the `T000/B000/XXXX` part of an incoming webhook URL) to post for real;
//! otherwise payloads are recorded and printed.
//!
//! Run with: cargo run --example webhook_sink

use rust_leveled_logger::handlers::{HttpTransport, RecordingTransport};
use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{WebhookConfig, WebhookHandler};

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - Webhook Example ===\n");

    let config = WebhookConfig::slack(
        &std::env::var("SLACK_WEBHOOK_TOKEN").unwrap_or_else(|_| "T000/B000/XXXX".to_string()),
    )
    .with_username("deploy-bot")
    .with_icon_emoji(":rocket:")
    .with_channel("#deploys")
    .with_title("release pipeline")
    .with_verbosity(LogLevel::Info);

    let recorder = RecordingTransport::new();
    let handler = if std::env::var("SLACK_WEBHOOK_TOKEN").is_ok() {
        println!("Posting to Slack\n");
        WebhookHandler::new(config, HttpTransport::new()?)
    } else {
        println!("SLACK_WEBHOOK_TOKEN not set, recording payloads\n");
        WebhookHandler::new(config, recorder.clone())
    };

    let logger = Logger::builder()
        .verbosity(LogLevel::Debug)
        .flags(Flags::CALLER)
        .output(Target::stdout())
        .handler(handler)
        .build();

    logger.debugw("resolving artifacts", values!["count", 12]);
    logger.info(values!["Deploy ", "v2.4.1", " started"]);
    logger.warnw("canary error rate elevated", values!["rate", 0.031, "threshold", 0.02]);
    logger.errorf(format_args!("rollback triggered after {} failed checks", 3));

    for failure in logger.take_handler_errors() {
        println!("handler failure: {}", failure);
    }

    if !recorder.is_empty() {
        println!("\nRecorded {} payload(s) (debug is below the handler verbosity):", recorder.len());
        for (url, message) in recorder.posted() {
            println!("POST {}", url);
            println!("{}\n", serde_json::to_string_pretty(&message)?);
        }
    }

    println!("=== Example completed successfully! ===");

    Ok(())
}
