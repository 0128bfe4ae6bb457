use core::fmt;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use super::{
    clock::{Clock, SystemClock},
    error::LogError,
    file_name::{create_log_file, resolve_path},
    level::Level,
    printf::{Arg, LINE_SEPARATOR},
    sinks::{ConsoleSink, FileSink, SinkKind, SinkSet},
    template::{expand_placeholders, render, RenderContext},
    LogSink,
};

pub const DEFAULT_LINE_TEMPLATE: &str = "[${name}] - ${fulltime} ${loglevel}: ";
pub const DEFAULT_FILE_NAME_TEMPLATE: &str = "${name}_${datefmt(yyyyMMdd-HHmmss)}.log";

/// Prefix used instead of the line template when line formatting is off.
pub const BARE_LEVEL_SEPARATOR: &str = ": ";

/// Settings of one logger. Produced by [`Builder`] and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    name: String,
    header: String,
    line_template: String,
    file_name_template: String,
    print_info: bool,
    print_debug: bool,
    print_err: bool,
    print_to_console: bool,
    print_to_file: bool,
    print_line_fmt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            header: String::new(),
            line_template: DEFAULT_LINE_TEMPLATE.to_string(),
            file_name_template: DEFAULT_FILE_NAME_TEMPLATE.to_string(),
            print_info: true,
            print_debug: true,
            print_err: true,
            print_to_console: true,
            print_to_file: true,
            print_line_fmt: true,
        }
    }
}

impl Config {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn line_template(&self) -> &str {
        &self.line_template
    }

    pub fn file_name_template(&self) -> &str {
        &self.file_name_template
    }

    pub fn print_line_fmt(&self) -> bool {
        self.print_line_fmt
    }

    pub fn level_enabled(&self, level: Level) -> bool {
        match level {
            Level::Info => self.print_info,
            Level::Debug => self.print_debug,
            Level::Err => self.print_err,
        }
    }

    pub fn sink_enabled(&self, sink: SinkKind) -> bool {
        match sink {
            SinkKind::Console => self.print_to_console,
            SinkKind::File => self.print_to_file,
        }
    }

    /// Prefix prepended to every message.
    pub fn line_prefix(&self) -> &str {
        if self.print_line_fmt {
            &self.line_template
        } else {
            BARE_LEVEL_SEPARATOR
        }
    }
}

/// An open logger.
///
/// Each call renders and writes its line while holding an internal lock, so
/// lines from concurrent callers never interleave.
pub struct Logger {
    config: Config,
    clock: Arc<dyn Clock>,
    file_path: Option<PathBuf>,
    sinks: Mutex<Option<SinkSet>>,
}

impl Logger {
    pub fn builder() -> Builder {
        Builder::new()
    }

    fn open(config: Config, clock: Arc<dyn Clock>, console: ConsoleSink) -> Result<Self, LogError> {
        let opened_at = clock.now();

        let header = if config.header.is_empty() {
            None
        } else {
            let ctx = RenderContext {
                name: &config.name,
                instant: opened_at,
                level: None,
            };
            let mut header = expand_placeholders(&config.header, &ctx)?;
            header.push_str(LINE_SEPARATOR);
            Some(header)
        };

        let mut file_sink = None;
        let mut file_path = None;
        if config.print_to_file {
            let path = resolve_path(&config.file_name_template, &config.name, opened_at)?;
            let file = create_log_file(&path)?;
            let mut sink = FileSink::new(file, &path);

            if let Some(header) = &header {
                if let Err(source) = sink.write_header(header) {
                    discard_log_file(sink);
                    return Err(LogError::FileCreation { path, source });
                }
            }

            tracing::debug!(target: "ezlogger", "opened log file {}", sink.path().display());
            file_sink = Some(sink);
            file_path = Some(path);
        }

        let mut sinks = SinkSet::new();
        if config.print_to_console {
            let mut console = console;
            if let Some(header) = &header {
                if let Err(source) = console.write_header(header) {
                    if let Some(sink) = file_sink {
                        discard_log_file(sink);
                    }
                    return Err(LogError::Write {
                        sink: SinkKind::Console,
                        source,
                    });
                }
            }
            sinks.push(Box::new(console));
        }
        if let Some(sink) = file_sink {
            sinks.push(Box::new(sink));
        }

        if sinks.is_empty() {
            tracing::debug!(target: "ezlogger", "logger '{}' has no enabled sink", config.name);
        }

        Ok(Self {
            config,
            clock,
            file_path,
            sinks: Mutex::new(Some(sinks)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the log file, when the file sink is enabled.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Writes `text` at `level`, interpolating `args` into it.
    pub fn log(&self, text: &str, level: Level, args: &[Arg]) -> Result<(), LogError> {
        match level {
            Level::Info => self.info_with(text, args),
            Level::Debug => self.debug_with(text, args),
            Level::Err => self.err_with(text, args),
        }
    }

    pub fn info(&self, text: &str) -> Result<(), LogError> {
        self.info_with(text, &[])
    }

    pub fn info_with(&self, text: &str, args: &[Arg]) -> Result<(), LogError> {
        self.emit(Level::Info, text, args)
    }

    /// Writes the `Display` form of `value` as is; `%` in it is not interpreted.
    pub fn info_value(&self, value: &dyn fmt::Display) -> Result<(), LogError> {
        self.emit(Level::Info, "%s", &[Arg::display(&value)])
    }

    pub fn debug(&self, text: &str) -> Result<(), LogError> {
        self.debug_with(text, &[])
    }

    pub fn debug_with(&self, text: &str, args: &[Arg]) -> Result<(), LogError> {
        self.emit(Level::Debug, text, args)
    }

    pub fn debug_value(&self, value: &dyn fmt::Display) -> Result<(), LogError> {
        self.emit(Level::Debug, "%s", &[Arg::display(&value)])
    }

    pub fn err(&self, text: &str) -> Result<(), LogError> {
        self.err_with(text, &[])
    }

    pub fn err_with(&self, text: &str, args: &[Arg]) -> Result<(), LogError> {
        self.emit(Level::Err, text, args)
    }

    pub fn err_value(&self, value: &dyn fmt::Display) -> Result<(), LogError> {
        self.emit(Level::Err, "%s", &[Arg::display(&value)])
    }

    /// Flushes and releases every sink. Any later call, including a second
    /// `close`, fails with [`LogError::Closed`].
    pub fn close(&self) -> Result<(), LogError> {
        let sinks = self.lock().take().ok_or(LogError::Closed)?;
        tracing::debug!(target: "ezlogger", "closing logger '{}'", self.config.name);
        sinks.close()
    }

    fn emit(&self, level: Level, body: &str, args: &[Arg]) -> Result<(), LogError> {
        let mut guard = self.lock();
        let sinks = guard.as_mut().ok_or(LogError::Closed)?;

        if !self.config.level_enabled(level) {
            return Ok(());
        }

        let prefix = self.config.line_prefix();
        let mut template = String::with_capacity(prefix.len() + body.len());
        template.push_str(prefix);
        template.push_str(body);

        let ctx = RenderContext {
            name: &self.config.name,
            instant: self.clock.now(),
            level: Some(level),
        };
        let line = render(&template, &ctx, args)?;

        sinks.dispatch(level, &line)
    }

    fn lock(&self) -> MutexGuard<'_, Option<SinkSet>> {
        // The guarded state is replaced atomically, so a poisoned lock still
        // holds a usable value.
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases a file opened by a construction that failed later on, and
/// removes it from disk.
fn discard_log_file(sink: FileSink) {
    let path = sink.path().to_path_buf();
    drop(sink);

    if let Err(err) = fs::remove_file(&path) {
        tracing::warn!(target: "ezlogger", "failed removing {}: {}", path.display(), err);
    }
}

type ConsoleFactory = Arc<dyn Fn() -> ConsoleSink + Send + Sync>;

/// Accumulates settings and opens a [`Logger`].
///
/// ```no_run
/// use ezlogger::Logger;
///
/// let logger = Logger::builder()
///     .with_name("svc")
///     .with_header("svc v1.0")
///     .with_debug(false)
///     .build()?;
///
/// logger.info_with("count=%d", &ezlogger::args![3])?;
/// logger.close()?;
/// # Ok::<(), ezlogger::LogError>(())
/// ```
pub struct Builder {
    config: Config,
    clock: Arc<dyn Clock>,
    console: ConsoleFactory,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            clock: Arc::new(SystemClock),
            console: Arc::new(ConsoleSink::stdio),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Line written once to every enabled sink when the logger opens. The
    /// header is a template: `${name}` and `${datefmt(PATTERN)}` are expanded
    /// against the opening instant, so an invalid date pattern in it makes
    /// [`Builder::build`] fail with [`LogError::Format`]. `%` is kept literally.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.config.header = header.into();
        self
    }

    pub fn with_line_template(mut self, template: impl Into<String>) -> Self {
        self.config.line_template = template.into();
        self
    }

    pub fn with_file_name_template(mut self, template: impl Into<String>) -> Self {
        self.config.file_name_template = template.into();
        self
    }

    pub fn with_info(mut self, enabled: bool) -> Self {
        self.config.print_info = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.config.print_debug = enabled;
        self
    }

    pub fn with_err(mut self, enabled: bool) -> Self {
        self.config.print_err = enabled;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.print_to_console = enabled;
        self
    }

    pub fn with_file(mut self, enabled: bool) -> Self {
        self.config.print_to_file = enabled;
        self
    }

    /// Turns the line template on or off. When off, lines are prefixed with
    /// [`BARE_LEVEL_SEPARATOR`] only.
    pub fn with_line_fmt(mut self, enabled: bool) -> Self {
        self.config.print_line_fmt = enabled;
        self
    }

    pub fn with_clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    /// Replaces the process standard-out/standard-error streams. Every build
    /// gets its own clone of the writers.
    pub fn with_console_writers<O, E>(self, out: O, err: E) -> Self
    where
        O: Write + Clone + Send + Sync + 'static,
        E: Write + Clone + Send + Sync + 'static,
    {
        Self {
            console: Arc::new(move || {
                ConsoleSink::new(Box::new(out.clone()), Box::new(err.clone()))
            }),
            ..self
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Opens the configured sinks and writes the header. Each call opens
    /// independent resources.
    pub fn build(&self) -> Result<Logger, LogError> {
        Logger::open(self.config.clone(), self.clock.clone(), (self.console)())
    }
}
