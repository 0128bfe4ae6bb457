mod args;
mod utils;

use crate::args::Ezlog;
use clap::Parser;
use std::process::ExitCode;
use yansi::{Condition, Paint};

fn main() -> ExitCode {
    yansi::whenever(Condition::STDERR_IS_TTY);
    let ezlog = Ezlog::parse();

    match ezlog.run() {
        Err(err) => {
            let root = err.root_cause();

            eprintln!("{}", format!("Error: {}", err).red());
            eprintln!();
            eprintln!("{}", "Caused by:".red());
            eprintln!("{}", format!("  {}", root).red());
            ExitCode::from(1)
        }
        Ok(_) => ExitCode::from(0),
    }
}
