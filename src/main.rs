//! ATM Simulator CLI
//!
//! Interactive terminal ATM working on the account and transaction files in
//! the data directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --data-dir ./bank --max-tries 5 --history-limit 20
//! ATM_LOG_LEVEL=debug cargo run
//! ```
//!
//! On first start the data directory is created and seeded with three
//! starter accounts.
//!
//! # Exit Codes
//!
//! - 0: User exited, or the card was blocked
//! - 1: Error (data directory not writable, terminal closed, etc.)

use rust_atm_simulator::cli::{self, ConsoleShell};
use rust_atm_simulator::core::{AccountStore, BankService};
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = cli::init_logging(args.log_level) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let data_dir = args.resolve_data_dir();
    log::info!("Using data directory {}", data_dir.display());

    let store = match AccountStore::open(&data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let service = BankService::new(store, args.to_bank_config());
    let mut shell = ConsoleShell::new(service);

    if let Err(e) = shell.run() {
        log::error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
