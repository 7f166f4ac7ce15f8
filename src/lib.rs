//! Rust ATM Simulator Library
//! # Overview
//!
//! This library simulates a cash machine backed by accounts and a
//! transaction log persisted as CSV files.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, Transaction, AtmError, money helpers)
//! - [`io`] - CSV format of the data files and atomic file replacement
//! - [`core`] - Business logic components:
//!   - [`core::account_store`] - Loading, seeding and persisting both collections
//!   - [`core::bank_service`] - Authentication and money movement rules
//!   - [`core::history`] - Newest-first history scan
//! - [`cli`] - CLI arguments parsing, logging setup and the console shell
//!
//! # Operations
//!
//! - **Login**: card number plus PIN; too many wrong PINs block the card
//! - **Deposit**: Credit cash to the account
//! - **Withdraw**: Debit cash (requires sufficient balance)
//! - **Transfer**: Move funds to the account holding another card
//! - **Change PIN**: Replace the PIN after confirming the current one
//! - **History**: The most recent operations involving the account
//!
//! Every successful mutation is written to disk together with its
//! transaction log entry before it is reported; a failed operation leaves
//! balances and the log untouched.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod types;

pub use crate::core::{AccountRepository, AccountStore, BankConfig, BankService, LoginAttempts, Receipt};
pub use types::{Account, AccountId, AtmError, Transaction, TransactionType};
