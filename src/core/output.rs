//! Output targets for rendered lines

use parking_lot::Mutex;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use super::error::Result;

/// A shareable, lockable writer.
///
/// Cloning a `Target` yields a handle to the same underlying writer, so one
/// sink can serve several levels (or several loggers) and every line is
/// written in one piece.
#[derive(Clone)]
pub struct Target {
    name: Arc<str>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Target {
    pub fn new(name: impl Into<Arc<str>>, writer: impl Write + Send + 'static) -> Self {
        Self {
            name: name.into(),
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new("stdout", io::stdout())
    }

    pub fn stderr() -> Self {
        Self::new("stderr", io::stderr())
    }

    /// Append to `path`, creating it when needed.
    pub fn file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(path.display().to_string(), BufWriter::new(file)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write a whole line and flush it before releasing the writer.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.writer.lock().flush()
    }

    /// Whether both handles share one writer.
    pub fn same_as(&self, other: &Target) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish()
    }
}

/// In-memory writer whose clones share one buffer.
///
/// # Example
///
/// ```
/// use rust_leveled_logger::prelude::*;
///
/// let buffer = BufferWriter::new();
/// let logger = Logger::builder()
///     .output(buffer.clone())
///     .color(false)
///     .build();
///
/// logger.info(values!["This is ", "info log"]);
/// assert!(buffer.contents().contains("This is info log"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<BufferWriter> for Target {
    fn from(buffer: BufferWriter) -> Self {
        Target::new("buffer", buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_shared_between_clones() {
        let buffer = BufferWriter::new();
        let target: Target = buffer.clone().into();

        target.write_line("first\n").unwrap();
        target.write_line("second\n").unwrap();

        assert_eq!(buffer.lines(), vec!["first", "second"]);
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_target_clone_shares_writer() {
        let target: Target = BufferWriter::new().into();
        let other = target.clone();
        assert!(target.same_as(&other));
        assert!(!target.same_as(&Target::stdout()));
    }

    #[test]
    fn test_file_target_appends() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("app.log");

        let target = Target::file(&path)?;
        target.write_line("one\n")?;
        drop(target);

        let target = Target::file(&path)?;
        target.write_line("two\n")?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content, "one\ntwo\n");
        Ok(())
    }
}
