//! Core business logic module
//!
//! This module contains the ATM's business logic and its storage:
//! - `traits` - Repository seam between the service and its storage
//! - `account_store` - File-backed accounts and transaction log
//! - `history` - Lazy newest-first scan of the transaction log
//! - `bank_service` - Login, deposit, withdrawal, transfer and PIN change

pub mod account_store;
pub mod bank_service;
pub mod history;
pub mod traits;

pub use account_store::{AccountStore, ACCOUNTS_FILE, TRANSACTIONS_FILE};
pub use bank_service::{
    BankConfig, BankService, LoginAttempts, LoginSuccess, Receipt, DEFAULT_HISTORY_LIMIT,
    DEFAULT_MAX_LOGIN_TRIES,
};
pub use history::RecentTransactions;
pub use traits::AccountRepository;
