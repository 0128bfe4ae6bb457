use core::fmt;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Debug,
    Err,
}

/// Console stream a level is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Info, Level::Debug, Level::Err];

    /// Display token substituted for `${loglevel}`.
    pub fn token(self) -> &'static str {
        match self {
            Level::Info => ": ",
            Level::Debug => "[Debug]: ",
            Level::Err => "[Error]: ",
        }
    }

    pub fn stream(self) -> Stream {
        match self {
            Level::Info | Level::Debug => Stream::Stdout,
            Level::Err => Stream::Stderr,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "INFO"),
            Level::Debug => write!(f, "DEBUG"),
            Level::Err => write!(f, "ERR"),
        }
    }
}
