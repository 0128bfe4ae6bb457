//! A small embeddable logger.
//!
//! A [`Logger`] renders INFO, DEBUG and ERR lines from a template and writes
//! them to the console and to a file named after the moment it was opened.
//! Templates use the placeholders `${name}`, `${fulltime}`, `${loglevel}` and
//! `${datefmt(PATTERN)}`; printf-style specifiers in the result are then filled
//! from positional arguments.
//!
//! ```no_run
//! use ezlogger::{args, Level, Logger};
//!
//! let logger = Logger::builder()
//!     .with_name("svc")
//!     .with_file_name_template("logs/${name}_${datefmt(yyyyMMdd-HHmmss)}.log")
//!     .build()?;
//!
//! logger.info("started")?;
//! logger.log("retrying in %d ms", Level::Err, &args![250])?;
//! logger.close()?;
//! # Ok::<(), ezlogger::LogError>(())
//! ```

pub mod logging;

pub use logging::*;
