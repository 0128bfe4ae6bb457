mod clock;
mod date_pattern;
mod error;
mod file_name;
mod level;
mod logger;
mod printf;
mod sinks;
mod template;

use std::io;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_pattern::format_instant;
pub use error::{FormatError, LogError};
pub use file_name::{create_log_file, resolve_path};
pub use level::{Level, Stream};
pub use logger::{
    Builder, Config, Logger, BARE_LEVEL_SEPARATOR, DEFAULT_FILE_NAME_TEMPLATE,
    DEFAULT_LINE_TEMPLATE,
};
pub use printf::{interpolate, Arg, LINE_SEPARATOR};
pub use sinks::{BoxedWriter, ConsoleSink, FileSink, SharedBuffer, SinkKind, SinkSet};
pub use template::{expand_placeholders, render, RenderContext};

/// A destination for rendered lines. Every write is flushed before returning.
pub trait LogSink: Send {
    fn kind(&self) -> SinkKind;
    fn write_header(&mut self, header: &str) -> io::Result<()>;
    fn write_line(&mut self, level: Level, line: &str) -> io::Result<()>;
    fn close(&mut self) -> io::Result<()>;
}
