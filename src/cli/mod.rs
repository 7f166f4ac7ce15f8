// CLI module
// Argument parsing, logging setup and the interactive console

mod args;
pub mod console;
pub mod output;

pub use args::{default_data_dir, CliArgs, LogLevel, DEFAULT_DATA_DIR};
pub use console::{ConsoleShell, MenuItem};

use crate::types::AtmError;
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Parse command-line arguments using clap
///
/// If parsing fails (e.g., invalid arguments or --help flag), clap displays
/// an error message or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Install the stderr logger
///
/// `level` is the default; `RUST_LOG` overrides it when set.
pub fn init_logging(level: LogLevel) -> Result<(), AtmError> {
    SimpleLogger::new()
        .with_level(LevelFilter::from(level))
        .env()
        .init()
        .map_err(|e| AtmError::Io {
            message: format!("cannot initialize logging: {}", e),
        })
}
