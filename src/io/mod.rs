//! I/O module
//!
//! Handles the persisted data files.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, tolerant readers, writers)
//! - `storage` - Atomic whole-file replacement and backups of damaged files

pub mod csv_format;
pub mod storage;

pub use csv_format::{
    read_accounts_csv, read_transactions_csv, write_accounts_csv, write_transactions_csv,
    AccountRow, Loaded,
};
pub use storage::{preserve_copy, write_atomically};
