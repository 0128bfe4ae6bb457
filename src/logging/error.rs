use std::path::PathBuf;

use thiserror::Error;

use super::sinks::SinkKind;

#[derive(Error, Debug)]
pub enum LogError {
    /// Parent directory of the log file could not be created.
    #[error("Failed creating log directory {}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Log file could not be created or replaced.
    #[error("Failed creating log file {}", path.display())]
    FileCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sink rejected a write or flush after the logger was opened.
    #[error("Failed writing to {sink} sink")]
    Write {
        sink: SinkKind,
        #[source]
        source: std::io::Error,
    },

    #[error("Logger is closed")]
    Closed,

    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("No argument left for format specifier '{specifier}'")]
    MissingArgument { specifier: String },

    #[error("Format specifier '{specifier}' can't be applied to a {kind} argument")]
    IllegalConversion {
        specifier: String,
        kind: &'static str,
    },

    #[error("Illegal pattern character '{letter}' in date pattern \"{pattern}\"")]
    InvalidDatePattern { pattern: String, letter: char },
}
