//! Basic logger usage example
//!
//! Demonstrates the four call shapes, verbosity gating and the output flags.
//!
//! Run with: cargo run --example basic_usage

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{info, warnw};

fn main() -> Result<()> {
    println!("=== Rust Leveled Logger - Basic Usage Example ===\n");

    // Everything goes to stdout so the demo output stays in order
    let logger = Logger::builder()
        .verbosity(LogLevel::Debug)
        .output(Target::stdout())
        .on_fatal(|code| println!("   (fatal hook called with exit code {})", code))
        .build();

    println!("1. Logging at different levels:");
    logger.debug(values!["This is a debug message"]);
    logger.info(values!["This is an info message"]);
    logger.warn(values!["This is a warning message"]);
    logger.error(values!["This is an error message"]);
    logger.fatal(values!["This is a fatal message"]);

    println!("\n2. Call shapes:");
    logger.info(values!["print joins text ", "without spaces: ", 1, 2, 3]);
    logger.infof(format_args!("printf formats {} of {}", 3, 10));
    logger.infoln(values!["println", "separates", "every", "operand"]);
    logger.infow("printw adds fields", values!["user", "alice", "attempts", 3]);
    info!(logger, "macros record the calling module: {}", module_path!());
    warnw!(logger, "odd field lists are padded", "orphan");

    println!("\n3. Verbosity gating:");
    logger.set_verbosity(LogLevel::Warn);
    println!("   Verbosity set to WARN - debug and info won't show:");
    logger.debug(values!["Debug message (hidden)"]);
    logger.info(values!["Info message (hidden)"]);
    logger.warn(values!["Warning message (visible)"]);
    logger.set_verbosity(LogLevel::Debug);

    println!("\n4. Timestamp, caller and fully structured lines:");
    logger.set_flags(Flags::TIMESTAMP | Flags::CALLER);
    logger.infow("plain with prefix", values!["port", 8080]);
    logger.set_flags(Flags::TIMESTAMP | Flags::CALLER | Flags::FULL_STRUCTURED);
    logger.infow("fully structured", values!["port", 8080]);
    logger.set_time_format("%H:%M:%S");
    logger.infow("custom time format", values!["port", 8080]);

    println!("\n5. Formatting disabled writes the message only:");
    logger.disable_log_format();
    logger.errorw("raw message", values!["ignored", true]);
    logger.enable_log_format();

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
