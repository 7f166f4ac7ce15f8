//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account record, card/PIN format rules and seed data
//! - `transaction`: Transaction log entries
//! - `money`: Amount normalization, parsing and formatting
//! - `error`: Error types for the ATM simulator

pub mod account;
pub mod error;
pub mod money;
pub mod transaction;

pub use account::{is_valid_card, is_valid_pin, seed_accounts, Account, AccountId};
pub use error::AtmError;
pub use money::{format_amount, normalize_amount, parse_amount, CURRENCY};
pub use transaction::{Transaction, TransactionType};
