use crate::core::{BankConfig, DEFAULT_HISTORY_LIMIT, DEFAULT_MAX_LOGIN_TRIES};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Name of the data directory created next to the executable
pub const DEFAULT_DATA_DIR: &str = "data";

/// Interactive ATM simulator
#[derive(Parser, Debug)]
#[command(name = "atm")]
#[command(about = "Interactive ATM simulator backed by CSV files", long_about = None)]
pub struct CliArgs {
    /// Directory holding accounts.csv and transactions.csv
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "ATM_DATA_DIR",
        help = "Directory with the account and transaction files (default: data/ next to the executable)"
    )]
    pub data_dir: Option<PathBuf>,

    /// Wrong PIN entries before a card is blocked
    #[arg(
        long = "max-tries",
        value_name = "COUNT",
        env = "ATM_MAX_TRIES",
        default_value_t = DEFAULT_MAX_LOGIN_TRIES,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Wrong PIN entries before the card is blocked"
    )]
    pub max_tries: u32,

    /// Number of transactions shown in the history view
    #[arg(
        long = "history-limit",
        value_name = "COUNT",
        env = "ATM_HISTORY_LIMIT",
        default_value_t = DEFAULT_HISTORY_LIMIT,
        value_parser = parse_history_limit,
        help = "Number of operations shown in the history view"
    )]
    pub history_limit: usize,

    /// Log verbosity on stderr
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        env = "ATM_LOG_LEVEL",
        default_value = "warn",
        help = "Log level: off, error, warn, info, debug or trace"
    )]
    pub log_level: LogLevel,
}

/// Log levels accepted on the command line
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn parse_history_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

impl CliArgs {
    /// Create a BankConfig from CLI arguments
    pub fn to_bank_config(&self) -> BankConfig {
        BankConfig {
            max_login_tries: self.max_tries,
            history_limit: self.history_limit,
        }
    }

    /// Data directory to use: the explicit one, or `data/` next to the executable
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// `data/` in the directory of the running executable
///
/// Falls back to `data/` in the working directory if the executable path is
/// unknown.
pub fn default_data_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DATA_DIR)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}
