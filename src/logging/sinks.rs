use core::fmt;
use std::{
    fs::File,
    io::{self, LineWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use super::{
    error::LogError,
    level::{Level, Stream},
    LogSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    Console,
    File,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkKind::Console => write!(f, "console"),
            SinkKind::File => write!(f, "file"),
        }
    }
}

pub type BoxedWriter = Box<dyn Write + Send>;

/// Standard-out/standard-error pair. Info and debug lines go to `out`, error
/// lines to `err`, the header to `out`.
pub struct ConsoleSink {
    out: BoxedWriter,
    err: BoxedWriter,
}

impl ConsoleSink {
    pub fn new(out: BoxedWriter, err: BoxedWriter) -> Self {
        Self { out, err }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }
}

impl LogSink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.out.write_all(header.as_bytes())?;
        self.out.flush()
    }

    fn write_line(&mut self, level: Level, line: &str) -> io::Result<()> {
        let writer = match level.stream() {
            Stream::Stdout => &mut self.out,
            Stream::Stderr => &mut self.err,
        };
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.out.flush()?;
        self.err.flush()
    }
}

pub struct FileSink {
    file: LineWriter<File>,
    file_path: PathBuf,
}

impl FileSink {
    pub fn new(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            file: LineWriter::new(file),
            file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl LogSink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::File
    }

    fn write_header(&mut self, header: &str) -> io::Result<()> {
        self.file.write_all(header.as_bytes())?;
        self.file.flush()
    }

    fn write_line(&mut self, _level: Level, line: &str) -> io::Result<()> {
        self.file.write_all(line.as_bytes())?;
        self.file.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()
    }
}

/// Every open sink of a logger, in dispatch order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn LogSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn LogSink>) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Writes `line` to every sink. A failing sink does not stop the others;
    /// the first failure is returned once all of them have been tried.
    pub fn dispatch(&mut self, level: Level, line: &str) -> Result<(), LogError> {
        let mut first_error = None;

        for sink in self.sinks.iter_mut() {
            if let Err(source) = sink.write_line(level, line) {
                tracing::warn!(target: "ezlogger", "write to {} sink failed: {}", sink.kind(), source);
                first_error.get_or_insert(LogError::Write {
                    sink: sink.kind(),
                    source,
                });
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Flushes and releases every sink.
    pub fn close(self) -> Result<(), LogError> {
        let mut first_error = None;

        for mut sink in self.sinks {
            if let Err(source) = sink.close() {
                first_error.get_or_insert(LogError::Write {
                    sink: sink.kind(),
                    source,
                });
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

/// In-memory writer whose clones share one buffer. Handy to capture console
/// output when embedding the logger or in tests.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.inner.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let mut buf = self
            .inner
            .lock()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
