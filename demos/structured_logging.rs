//! Structured logging example
//!
//! Demonstrates key/value fields, composite values, a JSON lines file
//! handler and a custom handler.
//!
//! Run with: cargo run --example structured_logging

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{Fields, JsonLinesHandler, LoggerSettings};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts error-or-worse calls.
#[derive(Default)]
struct ErrorCounter {
    errors: AtomicUsize,
}

impl Handler for ErrorCounter {
    fn notify(
        &self,
        _shape: Shape,
        _logger: &LoggerSettings,
        level: LogLevel,
        _fields: &Fields,
    ) -> Result<()> {
        if level <= LogLevel::Error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "error-counter"
    }
}

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - Structured Logging Example ===\n");

    let log_path = std::env::temp_dir().join("rust_leveled_logger_demo.jsonl");
    let counter = Arc::new(ErrorCounter::default());

    let logger = Logger::builder()
        .verbosity(LogLevel::Debug)
        .flags(Flags::TIMESTAMP | Flags::CALLER | Flags::FULL_STRUCTURED)
        .output(Target::stdout())
        .handler(JsonLinesHandler::file(&log_path)?.with_verbosity(LogLevel::Info))
        .build();
    logger.add_handler(counter.clone());

    println!("1. Scalars, text and composite values:");
    let mut limits = BTreeMap::new();
    limits.insert("cpu", 2);
    limits.insert("memory_mb", 512);
    logger.infow(
        "container started",
        values![
            "name",
            "api-7f9c",
            "replicas",
            3,
            "healthy",
            true,
            "limits",
            Value::serialized(&limits),
            "ports",
            Value::debug(&[8080, 9090]),
        ],
    );

    println!("\n2. Quoting and escaping:");
    logger.warnw(
        "config reloaded",
        values!["path", "/etc/app/config.toml", "comment", "said \"hi\"", "note", "two words"],
    );

    println!("\n3. Debug calls stay out of the JSON file (handler verbosity is INFO):");
    logger.debugw("cache stats", values!["hits", 1042, "misses", 17]);
    logger.errorw("upstream timeout", values!["service", "billing", "after_ms", 5000]);

    logger.flush()?;

    println!("\n4. JSON lines written to {}:", log_path.display());
    for line in std::fs::read_to_string(&log_path)?.lines() {
        println!("   {}", line);
    }

    println!(
        "\n5. Error counter handler saw {} error call(s)",
        counter.errors.load(Ordering::Relaxed)
    );

    std::fs::remove_file(&log_path)?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
