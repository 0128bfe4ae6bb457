use chrono::{DateTime, FixedOffset};
use clap::{Parser, ValueEnum};
use eyre::Context;
use ezlogger::{Arg, FixedClock, Level, Logger, DEFAULT_FILE_NAME_TEMPLATE, DEFAULT_LINE_TEMPLATE};
use tracing::level_filters::LevelFilter;

use crate::utils::{parse_arg, parse_instant};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LevelArg {
    Info,
    Debug,
    Err,
}

impl From<LevelArg> for Level {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Info => Level::Info,
            LevelArg::Debug => Level::Debug,
            LevelArg::Err => Level::Err,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Write one templated log line to the console and a timestamped log file.", long_about = None)]
pub struct Ezlog {
    #[arg(index = 1, help = "Message text, may contain printf-style specifiers.")]
    pub message: String,

    #[arg(index = 2, help = "Positional arguments for the specifiers in the message.")]
    pub args: Vec<String>,

    #[arg(long, default_value = "", help = "Logger name, substituted for ${name}.")]
    pub name: String,

    #[arg(long, default_value = "", help = "Header written once when the logger opens.")]
    pub header: String,

    #[arg(long, default_value = DEFAULT_LINE_TEMPLATE, help = "Template prepended to every line.")]
    pub template: String,

    #[arg(long, default_value = DEFAULT_FILE_NAME_TEMPLATE, help = "Template of the log file path.")]
    pub file_template: String,

    #[arg(long, short, value_enum, default_value_t = LevelArg::Info)]
    pub level: LevelArg,

    #[arg(
        long,
        value_parser = parse_instant,
        help = "Pin the clock to this instant (RFC 3339 or 'YYYY-MM-DD HH:MM:SS')."
    )]
    pub at: Option<DateTime<FixedOffset>>,

    #[arg(long, help = "Prefix lines with the bare level separator only.")]
    pub no_line_fmt: bool,

    #[arg(long, help = "Don't write to standard out/err.")]
    pub no_console: bool,

    #[arg(long, help = "Don't create a log file.")]
    pub no_file: bool,

    #[arg(long, help = "Drop INFO lines.")]
    pub no_info: bool,

    #[arg(long, help = "Drop DEBUG lines.")]
    pub no_debug: bool,

    #[arg(long, help = "Drop ERR lines.")]
    pub no_err: bool,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        help = "Write diagnostic messages to stderr.",
        display_order = 999
    )]
    pub verbose: u8,
}

impl Ezlog {
    fn log_filter(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            5..=u8::MAX => LevelFilter::TRACE,
        }
    }

    fn setup_tracing(&self) -> eyre::Result<()> {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(self.log_filter())
            .try_init()
            .map_err(|e| eyre::eyre!(e))
            .context("Failed installing diagnostics subscriber")
    }

    pub fn run(self) -> eyre::Result<()> {
        self.setup_tracing()?;

        let mut builder = Logger::builder()
            .with_name(&self.name)
            .with_header(&self.header)
            .with_line_template(&self.template)
            .with_file_name_template(&self.file_template)
            .with_line_fmt(!self.no_line_fmt)
            .with_console(!self.no_console)
            .with_file(!self.no_file)
            .with_info(!self.no_info)
            .with_debug(!self.no_debug)
            .with_err(!self.no_err);

        if let Some(at) = self.at {
            builder = builder.with_clock(FixedClock(at));
        }

        let logger = builder.build().context("Failed opening logger")?;
        if let Some(path) = logger.file_path() {
            tracing::info!(target: "ezlog", "writing to {}", path.display());
        }

        let args: Vec<Arg> = self.args.iter().map(|a| parse_arg(a)).collect();
        logger
            .log(&self.message, self.level.into(), &args)
            .context("Failed writing log line")?;

        logger.close().context("Failed closing logger")
    }
}
