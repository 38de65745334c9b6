//! Main logger implementation
//!
//! Every public entry point takes the logger's lock exactly once and, while
//! holding it, gates the call, captures its [`Fields`], renders them to the
//! level's output target and notifies every handler in registration order.
//! Handlers therefore see the same snapshot that was written, and lines from
//! concurrent callers never interleave.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    caller::{CallSite, CallerResolver, ShortCallerResolver},
    config::{Flags, LoggerSettings},
    error::{LoggerError, Result},
    field::{join_print, join_println, keys, pair_key_values, Field, Fields, Value},
    formatter::RenderMode,
    handler::{Handler, HandlerErrorPolicy, HandlerFailure, Shape},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    output::Target,
    timestamp::{Clock, SystemClock, TimestampFormat},
};

/// Exit status passed to the fatal hook.
pub const FATAL_EXIT_CODE: i32 = 1;

/// Called after a fatal call has been written and dispatched.
pub type FatalHook = Arc<dyn Fn(i32) + Send + Sync>;

/// The arguments of one log call, by shape.
#[derive(Debug, Clone)]
pub enum Message<'a> {
    /// Operands joined like `Sprint`.
    Print(&'a [Value]),
    /// Pre-formatted arguments, usually from `format_args!`.
    Printf(fmt::Arguments<'a>),
    /// Operands space-joined with a trailing newline.
    Println(&'a [Value]),
    /// A message and a flat `key, value, ...` list.
    Structured(Value, &'a [Value]),
}

impl Message<'_> {
    pub fn shape(&self) -> Shape {
        match self {
            Message::Print(_) => Shape::Print,
            Message::Printf(_) => Shape::Printf,
            Message::Println(_) => Shape::Println,
            Message::Structured(..) => Shape::PrintStructured,
        }
    }

    /// Split into the `msg` value and the user pairs.
    fn into_payload(self) -> (Value, Vec<Field>) {
        match self {
            Message::Print(values) => (Value::Text(join_print(values)), Vec::new()),
            Message::Printf(args) => (Value::Text(args.to_string()), Vec::new()),
            Message::Println(values) => (Value::Text(join_println(values)), Vec::new()),
            Message::Structured(msg, pairs) => (msg, pair_key_values(pairs)),
        }
    }
}

#[derive(Debug, Clone)]
struct LevelOutput {
    target: Target,
    color: bool,
}

struct State {
    settings: LoggerSettings,
    /// Indexed by `LogLevel::slot`.
    outputs: [LevelOutput; 5],
    handlers: Vec<Arc<dyn Handler>>,
    error_policy: HandlerErrorPolicy,
    handler_errors: Vec<HandlerFailure>,
    clock: Arc<dyn Clock>,
    caller_resolver: Arc<dyn CallerResolver>,
}

impl State {
    fn capture(&self, site: &CallSite, level: LogLevel, message: Message<'_>) -> Fields {
        let flags = self.settings.flags;
        let mut prefix = Vec::with_capacity(3);

        if flags.contains(Flags::TIMESTAMP) {
            let now = self.clock.now();
            prefix.push(Field::new(
                keys::TIMESTAMP,
                Value::display(&self.settings.timestamp_format.format(&now)),
            ));
        }
        if flags.contains(Flags::CALLER) {
            prefix.push(Field::new(
                keys::CALLER,
                Value::display(&self.caller_resolver.resolve(site)),
            ));
        }
        prefix.push(Field::new(keys::LEVEL, Value::display(level.to_str())));

        let (msg, extras) = message.into_payload();
        Fields::new(prefix, msg, extras)
    }
}

pub struct Logger {
    state: Mutex<State>,
    metrics: LoggerMetrics,
    on_fatal: FatalHook,
}

impl Logger {
    /// A logger with the default configuration: verbosity `Info`, no flags,
    /// formatting and color on, Fatal/Error to stderr and the rest to stdout.
    #[must_use]
    pub fn new() -> Self {
        LoggerBuilder::new().build()
    }

    /// Log one call at an explicit call site.
    ///
    /// Returns the first handler failure under
    /// [`HandlerErrorPolicy::PropagateFirst`]; every other outcome is `Ok`.
    /// A fatal call runs the fatal hook before returning, whatever the outcome.
    pub fn emit(&self, site: CallSite, level: LogLevel, message: Message<'_>) -> Result<()> {
        let outcome = self.process(&site, level, message);
        self.finish(level);
        outcome.map_err(|failure| failure.error)
    }

    /// Like [`emit`](Self::emit), but a propagated handler failure is kept
    /// for [`take_handler_errors`](Self::take_handler_errors) instead.
    pub fn log_at(&self, site: CallSite, level: LogLevel, message: Message<'_>) {
        if let Err(failure) = self.process(&site, level, message) {
            self.state.lock().handler_errors.push(failure);
        }
        self.finish(level);
    }

    /// Plain-join call at `level`.
    ///
    /// Methods capture only the file and line of the call; the function
    /// segment of `caller` is `?`. The macros (`info!`, `infow!`, ...) also
    /// record the calling module.
    #[track_caller]
    pub fn print(&self, level: LogLevel, values: impl AsRef<[Value]>) {
        self.log_at(CallSite::caller(), level, Message::Print(values.as_ref()));
    }

    /// Printf-style call at `level`.
    #[track_caller]
    pub fn printf(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.log_at(CallSite::caller(), level, Message::Printf(args));
    }

    /// Line call at `level`.
    #[track_caller]
    pub fn println(&self, level: LogLevel, values: impl AsRef<[Value]>) {
        self.log_at(CallSite::caller(), level, Message::Println(values.as_ref()));
    }

    /// Structured call at `level`.
    #[track_caller]
    pub fn printw(&self, level: LogLevel, msg: impl Into<Value>, key_values: impl AsRef<[Value]>) {
        self.log_at(
            CallSite::caller(),
            level,
            Message::Structured(msg.into(), key_values.as_ref()),
        );
    }

    fn process(
        &self,
        site: &CallSite,
        level: LogLevel,
        message: Message<'_>,
    ) -> std::result::Result<(), HandlerFailure> {
        let mut state = self.state.lock();

        let slot = match level.slot() {
            Some(slot) if level.is_enabled_at(state.settings.verbosity) => slot,
            _ => {
                self.metrics.record_filtered();
                return Ok(());
            }
        };
        self.metrics.record_emitted();

        let shape = message.shape();
        let fields = state.capture(site, level, message);

        let mode = RenderMode::select(state.settings.format_enabled, state.settings.flags);
        let output = &state.outputs[slot];
        let line = mode.render(&fields, level, output.color);
        if let Err(e) = output.target.write_line(&line) {
            self.metrics.record_write_failure();
            eprintln!(
                "[LOGGER ERROR] Failed to write {} line to '{}': {}",
                level,
                output.target.name(),
                e
            );
        }

        self.dispatch(&mut state, shape, level, &fields)
    }

    /// Notify every handler in order, isolating each one's failures and panics.
    fn dispatch(
        &self,
        state: &mut State,
        shape: Shape,
        level: LogLevel,
        fields: &Fields,
    ) -> std::result::Result<(), HandlerFailure> {
        let State {
            settings,
            handlers,
            error_policy,
            handler_errors,
            ..
        } = state;

        for handler in handlers.iter() {
            self.metrics.record_handler_invocation();

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                handler.notify(shape, settings, level, fields)
            }));
            let error = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e,
                Err(panic) => LoggerError::handler(
                    handler.name(),
                    format!("panicked: {}", panic_message(panic.as_ref())),
                ),
            };

            self.metrics.record_handler_failure();
            let failure = HandlerFailure {
                handler: handler.name().to_string(),
                level,
                error,
            };
            match error_policy {
                HandlerErrorPolicy::Discard => {
                    eprintln!("[LOGGER ERROR] {}", failure);
                }
                HandlerErrorPolicy::Collect => handler_errors.push(failure),
                HandlerErrorPolicy::PropagateFirst => return Err(failure),
            }
        }

        Ok(())
    }

    /// Runs after the lock is released.
    fn finish(&self, level: LogLevel) {
        if level == LogLevel::Fatal {
            (self.on_fatal)(FATAL_EXIT_CODE);
        }
    }

    /// Set the verbosity threshold. `None` silences every level.
    pub fn set_verbosity(&self, verbosity: LogLevel) {
        self.state.lock().settings.verbosity = verbosity;
    }

    /// Set the verbosity from a raw level number, clamping out-of-range
    /// values to `None` or `Debug`.
    pub fn set_verbosity_raw(&self, verbosity: i64) {
        self.set_verbosity(LogLevel::from_i64_clamped(verbosity));
    }

    pub fn verbosity(&self) -> LogLevel {
        self.state.lock().settings.verbosity
    }

    /// Send every level to `target`.
    pub fn set_output(&self, target: impl Into<Target>) {
        let target = target.into();
        let mut state = self.state.lock();
        for output in state.outputs.iter_mut() {
            output.target = target.clone();
        }
    }

    /// Send one level to `target`. `LogLevel::None` has no output and is ignored.
    pub fn set_level_output(&self, level: LogLevel, target: impl Into<Target>) {
        if let Some(slot) = level.slot() {
            self.state.lock().outputs[slot].target = target.into();
        }
    }

    pub fn set_flags(&self, flags: Flags) {
        self.state.lock().settings.flags = flags;
    }

    pub fn flags(&self) -> Flags {
        self.state.lock().settings.flags
    }

    /// Use a custom strftime pattern for the `ts` field.
    pub fn set_time_format(&self, pattern: impl Into<String>) {
        self.set_timestamp_format(TimestampFormat::Custom(pattern.into()));
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) {
        self.state.lock().settings.timestamp_format = format;
    }

    /// Render prefix, level and fields (the default).
    pub fn enable_log_format(&self) {
        self.state.lock().settings.format_enabled = true;
    }

    /// Write only the raw message text, uncolored.
    pub fn disable_log_format(&self) {
        self.state.lock().settings.format_enabled = false;
    }

    pub fn enable_color(&self) {
        self.set_all_colors(true);
    }

    pub fn disable_color(&self) {
        self.set_all_colors(false);
    }

    pub fn enable_level_color(&self, level: LogLevel) {
        self.set_level_color(level, true);
    }

    pub fn disable_level_color(&self, level: LogLevel) {
        self.set_level_color(level, false);
    }

    fn set_all_colors(&self, enabled: bool) {
        let mut state = self.state.lock();
        for output in state.outputs.iter_mut() {
            output.color = enabled;
        }
    }

    fn set_level_color(&self, level: LogLevel, enabled: bool) {
        if let Some(slot) = level.slot() {
            self.state.lock().outputs[slot].color = enabled;
        }
    }

    /// Whether `level` is currently rendered with color.
    pub fn level_color(&self, level: LogLevel) -> bool {
        level
            .slot()
            .map(|slot| self.state.lock().outputs[slot].color)
            .unwrap_or(false)
    }

    /// Append a handler. Handlers are notified in registration order and
    /// must not log through this logger.
    pub fn add_handler(&self, handler: Arc<dyn Handler>) {
        self.state.lock().handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.state.lock().handlers.len()
    }

    pub fn set_error_policy(&self, policy: HandlerErrorPolicy) {
        self.state.lock().error_policy = policy;
    }

    pub fn error_policy(&self) -> HandlerErrorPolicy {
        self.state.lock().error_policy
    }

    /// Drain the handler failures kept so far.
    pub fn take_handler_errors(&self) -> Vec<HandlerFailure> {
        std::mem::take(&mut self.state.lock().handler_errors)
    }

    /// A copy of the settings handlers are given.
    pub fn settings(&self) -> LoggerSettings {
        self.state.lock().settings.clone()
    }

    /// Get the logger metrics for observability
    ///
    /// # Example
    ///
    /// ```
    /// use rust_leveled_logger::prelude::*;
    ///
    /// let logger = Logger::builder().output(BufferWriter::new()).build();
    /// logger.info(values!["shown"]);
    /// logger.debug(values!["hidden"]);
    ///
    /// assert_eq!(logger.metrics().emitted(), 1);
    /// assert_eq!(logger.metrics().filtered(), 1);
    /// ```
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Flush every output target.
    pub fn flush(&self) -> Result<()> {
        let state = self.state.lock();
        for output in state.outputs.iter() {
            output.target.flush()?;
        }
        Ok(())
    }
}

macro_rules! level_methods {
    ($level:expr, $print:ident, $printf:ident, $println:ident, $printw:ident) => {
        impl Logger {
            #[track_caller]
            #[inline]
            pub fn $print(&self, values: impl AsRef<[Value]>) {
                self.print($level, values);
            }

            #[track_caller]
            #[inline]
            pub fn $printf(&self, args: fmt::Arguments<'_>) {
                self.printf($level, args);
            }

            #[track_caller]
            #[inline]
            pub fn $println(&self, values: impl AsRef<[Value]>) {
                self.println($level, values);
            }

            #[track_caller]
            #[inline]
            pub fn $printw(&self, msg: impl Into<Value>, key_values: impl AsRef<[Value]>) {
                self.printw($level, msg, key_values);
            }
        }
    };
}

level_methods!(LogLevel::Debug, debug, debugf, debugln, debugw);
level_methods!(LogLevel::Info, info, infof, infoln, infow);
level_methods!(LogLevel::Warn, warn, warnf, warnln, warnw);
level_methods!(LogLevel::Error, error, errorf, errorln, errorw);
level_methods!(LogLevel::Fatal, fatal, fatalf, fatalln, fatalw);

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Logger")
            .field("settings", &state.settings)
            .field("handlers", &state.handlers.len())
            .field("error_policy", &state.error_policy)
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_leveled_logger::prelude::*;
///
/// let buffer = BufferWriter::new();
/// let logger = Logger::builder()
///     .verbosity(LogLevel::Debug)
///     .flags(Flags::CALLER | Flags::FULL_STRUCTURED)
///     .output(buffer.clone())
///     .color(false)
///     .build();
///
/// logger.debugw("cache miss", values!["key", "user:42"]);
/// assert!(buffer.contents().contains(r#"level=DEBUG msg="cache miss" key="user:42""#));
/// ```
pub struct LoggerBuilder {
    settings: LoggerSettings,
    color: bool,
    output: Option<Target>,
    level_outputs: Vec<(LogLevel, Target)>,
    handlers: Vec<Arc<dyn Handler>>,
    error_policy: HandlerErrorPolicy,
    clock: Arc<dyn Clock>,
    caller_resolver: Arc<dyn CallerResolver>,
    on_fatal: FatalHook,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            settings: LoggerSettings::default(),
            color: true,
            output: None,
            level_outputs: Vec::new(),
            handlers: Vec::new(),
            error_policy: HandlerErrorPolicy::default(),
            clock: Arc::new(SystemClock),
            caller_resolver: Arc::new(ShortCallerResolver),
            on_fatal: Arc::new(|code| std::process::exit(code)),
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn verbosity(mut self, verbosity: LogLevel) -> Self {
        self.settings.verbosity = verbosity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.settings.flags = flags;
        self
    }

    /// Custom strftime pattern for the `ts` field.
    #[must_use = "builder methods return a new value"]
    pub fn time_format(self, pattern: impl Into<String>) -> Self {
        self.timestamp_format(TimestampFormat::Custom(pattern.into()))
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.settings.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format_enabled(mut self, enabled: bool) -> Self {
        self.settings.format_enabled = enabled;
        self
    }

    /// Color for every level.
    #[must_use = "builder methods return a new value"]
    pub fn color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// One target for every level, replacing the stdout/stderr split.
    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, target: impl Into<Target>) -> Self {
        self.output = Some(target.into());
        self
    }

    /// Target for a single level; applied after [`output`](Self::output).
    #[must_use = "builder methods return a new value"]
    pub fn level_output(mut self, level: LogLevel, target: impl Into<Target>) -> Self {
        self.level_outputs.push((level, target.into()));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_policy(mut self, policy: HandlerErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver<R: CallerResolver + 'static>(mut self, resolver: R) -> Self {
        self.caller_resolver = Arc::new(resolver);
        self
    }

    /// Replace `std::process::exit` as the action taken after a fatal call.
    #[must_use = "builder methods return a new value"]
    pub fn on_fatal(mut self, hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.on_fatal = Arc::new(hook);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let stdout = Target::stdout();
        let stderr = Target::stderr();
        let color = self.color;
        let mut outputs = LogLevel::EMITTING.map(|level| {
            let target = match &self.output {
                Some(target) => target.clone(),
                None if level.uses_stderr_by_default() => stderr.clone(),
                None => stdout.clone(),
            };
            LevelOutput { target, color }
        });

        for (level, target) in self.level_outputs {
            if let Some(slot) = level.slot() {
                outputs[slot].target = target;
            }
        }

        Logger {
            state: Mutex::new(State {
                settings: self.settings,
                outputs,
                handlers: self.handlers,
                error_policy: self.error_policy,
                handler_errors: Vec::new(),
                clock: self.clock,
                caller_resolver: self.caller_resolver,
            }),
            metrics: LoggerMetrics::new(),
            on_fatal: self.on_fatal,
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_leveled_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .verbosity(LogLevel::Warn)
    ///     .flags(Flags::TIMESTAMP)
    ///     .build();
    /// assert_eq!(logger.verbosity(), LogLevel::Warn);
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::output::BufferWriter;
    use crate::core::timestamp::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicI32, Ordering};

    fn buffered() -> (Logger, BufferWriter) {
        let buffer = BufferWriter::new();
        let logger = Logger::builder().output(buffer.clone()).color(false).build();
        (logger, buffer)
    }

    struct Failing;

    impl Handler for Failing {
        fn notify(&self, _: Shape, _: &LoggerSettings, _: LogLevel, _: &Fields) -> Result<()> {
            Err(LoggerError::handler("failing", "sink offline"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct Panicking;

    impl Handler for Panicking {
        fn notify(&self, _: Shape, _: &LoggerSettings, _: LogLevel, _: &Fields) -> Result<()> {
            panic!("handler exploded");
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    #[derive(Default)]
    struct Counting {
        calls: Mutex<Vec<(Shape, LogLevel, String)>>,
    }

    impl Handler for Counting {
        fn notify(
            &self,
            shape: Shape,
            _: &LoggerSettings,
            level: LogLevel,
            fields: &Fields,
        ) -> Result<()> {
            self.calls.lock().push((shape, level, fields.message().to_string()));
            Ok(())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().build();
        assert_eq!(logger.verbosity(), LogLevel::Info);
        assert!(logger.flags().is_empty());
        assert!(logger.settings().format_enabled);
        assert!(logger.level_color(LogLevel::Info));
        assert_eq!(logger.error_policy(), HandlerErrorPolicy::Discard);
        assert_eq!(logger.handler_count(), 0);
    }

    #[test]
    fn test_print_shape() {
        let (logger, buffer) = buffered();
        logger.info([Value::from("This is "), Value::from("info log")]);
        assert_eq!(buffer.contents(), "INFO:  This is info log\n");
    }

    #[test]
    fn test_printf_shape() {
        let (logger, buffer) = buffered();
        logger.warnf(format_args!("disk at {}%", 91));
        assert_eq!(buffer.contents(), "WARN:  disk at 91%\n");
    }

    #[test]
    fn test_println_shape_has_single_newline() {
        let (logger, buffer) = buffered();
        logger.errorln([Value::from("a"), Value::from(1)]);
        assert_eq!(buffer.contents(), "ERROR: a 1\n");
    }

    #[test]
    fn test_gated_out_call_is_counted() {
        let (logger, buffer) = buffered();
        logger.debug([Value::from("hidden")]);
        assert!(buffer.is_empty());
        assert_eq!(logger.metrics().filtered(), 1);
        assert_eq!(logger.metrics().emitted(), 0);
    }

    #[test]
    fn test_set_verbosity_raw_clamps() {
        let logger = Logger::new();
        logger.set_verbosity_raw(42);
        assert_eq!(logger.verbosity(), LogLevel::Debug);
        logger.set_verbosity_raw(-3);
        assert_eq!(logger.verbosity(), LogLevel::None);
    }

    #[test]
    fn test_fixed_clock_timestamp() {
        let buffer = BufferWriter::new();
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
        let logger = Logger::builder()
            .output(buffer.clone())
            .color(false)
            .flags(Flags::TIMESTAMP)
            .clock(FixedClock(at))
            .build();

        logger.info([Value::from("tick")]);
        assert_eq!(buffer.contents(), "2025-01-08T10:30:45.000Z INFO:  tick\n");
    }

    #[test]
    fn test_caller_points_at_call_site() {
        let buffer = BufferWriter::new();
        let logger = Logger::builder()
            .output(buffer.clone())
            .color(false)
            .flags(Flags::CALLER)
            .build();

        let line = line!() + 1;
        logger.info([Value::from("here")]);
        assert_eq!(
            buffer.contents(),
            format!("logger.rs:{}:? INFO:  here\n", line)
        );
    }

    #[test]
    fn test_handlers_in_order_with_same_snapshot() {
        let (logger, _buffer) = buffered();
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());
        logger.add_handler(first.clone());
        logger.add_handler(second.clone());

        logger.infow("hello", [Value::from("k"), Value::from(1)]);
        logger.debug([Value::from("gated")]);

        assert_eq!(first.calls.lock().len(), 1);
        assert_eq!(*first.calls.lock(), *second.calls.lock());
        assert_eq!(first.calls.lock()[0].0, Shape::PrintStructured);
        assert_eq!(logger.metrics().handler_invocations(), 2);
    }

    struct Unwritable;

    impl std::io::Write for Unwritable {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_counted_and_dispatch_continues() {
        let handler = Arc::new(Counting::default());
        let logger = Logger::builder()
            .output(Target::new("unwritable", Unwritable))
            .color(false)
            .build();
        logger.add_handler(handler.clone());

        logger.warn([Value::from("lost")]);
        assert_eq!(logger.metrics().write_failures(), 1);
        assert_eq!(logger.metrics().emitted(), 1);
        assert_eq!(handler.calls.lock().len(), 1);
    }

    #[test]
    fn test_discard_policy_counts_failures() {
        let (logger, buffer) = buffered();
        logger.add_handler(Arc::new(Failing));
        logger.info([Value::from("still written")]);

        assert!(buffer.contents().contains("still written"));
        assert_eq!(logger.metrics().handler_failures(), 1);
        assert!(logger.take_handler_errors().is_empty());
    }

    #[test]
    fn test_collect_policy_keeps_failures() {
        let (logger, _buffer) = buffered();
        logger.set_error_policy(HandlerErrorPolicy::Collect);
        logger.add_handler(Arc::new(Failing));
        logger.add_handler(Arc::new(Panicking));

        logger.error([Value::from("boom")]);
        let errors = logger.take_handler_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].handler, "failing");
        assert!(errors[1].error.to_string().contains("handler exploded"));
        assert!(logger.take_handler_errors().is_empty());
    }

    #[test]
    fn test_propagate_first_stops_dispatch() {
        let (logger, _buffer) = buffered();
        let after = Arc::new(Counting::default());
        logger.set_error_policy(HandlerErrorPolicy::PropagateFirst);
        logger.add_handler(Arc::new(Failing));
        logger.add_handler(after.clone());

        let result = logger.emit(
            CallSite::caller(),
            LogLevel::Info,
            Message::Print(&[Value::from("x")]),
        );
        assert!(matches!(result, Err(LoggerError::Handler { .. })));
        assert!(after.calls.lock().is_empty());

        logger.info([Value::from("y")]);
        assert_eq!(logger.take_handler_errors().len(), 1);
    }

    #[test]
    fn test_fatal_runs_hook_after_dispatch() {
        let code = Arc::new(AtomicI32::new(0));
        let seen = Arc::clone(&code);
        let buffer = BufferWriter::new();
        let logger = Logger::builder()
            .output(buffer.clone())
            .color(false)
            .on_fatal(move |c| seen.store(c, Ordering::SeqCst))
            .build();

        logger.fatalf(format_args!("unrecoverable"));
        assert_eq!(buffer.contents(), "FATAL: unrecoverable\n");
        assert_eq!(code.load(Ordering::SeqCst), FATAL_EXIT_CODE);
    }

    #[test]
    fn test_fatal_hook_runs_even_when_silenced() {
        let code = Arc::new(AtomicI32::new(0));
        let seen = Arc::clone(&code);
        let logger = Logger::builder()
            .verbosity(LogLevel::None)
            .output(BufferWriter::new())
            .on_fatal(move |c| seen.store(c, Ordering::SeqCst))
            .build();

        logger.fatal([Value::from("quiet")]);
        assert_eq!(code.load(Ordering::SeqCst), FATAL_EXIT_CODE);
    }

    #[test]
    fn test_level_output_and_color_toggles() {
        let all = BufferWriter::new();
        let errors = BufferWriter::new();
        let logger = Logger::builder()
            .output(all.clone())
            .level_output(LogLevel::Error, errors.clone())
            .build();

        logger.disable_color();
        logger.enable_level_color(LogLevel::Warn);
        assert!(logger.level_color(LogLevel::Warn));
        assert!(!logger.level_color(LogLevel::Info));
        assert!(!logger.level_color(LogLevel::None));

        logger.error([Value::from("bad")]);
        logger.info([Value::from("fine")]);
        assert_eq!(errors.contents(), "ERROR: bad\n");
        assert_eq!(all.contents(), "INFO:  fine\n");
    }

    #[test]
    fn test_disable_log_format() {
        let (logger, buffer) = buffered();
        logger.set_flags(Flags::TIMESTAMP | Flags::CALLER);
        logger.disable_log_format();
        logger.infow("raw", [Value::from("k"), Value::from("v")]);
        assert_eq!(buffer.contents(), "raw\n");

        logger.enable_log_format();
        assert!(logger.settings().format_enabled);
    }
}
