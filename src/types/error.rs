//! Error types for the ATM simulator
//!
//! This module defines every error an ATM operation can report.
//!
//! # Error Categories
//!
//! - **Input Errors**: malformed card number, PIN or amount
//! - **Authentication Errors**: unknown/blocked card, wrong PIN, lockout
//! - **Transaction Errors**: invalid amount, insufficient funds, bad recipient
//! - **Storage Errors**: the data directory or a data file could not be read or written
//!
//! Only storage errors are fatal. Every other variant is a domain outcome that
//! leaves balances and the transaction log untouched; the caller displays the
//! message and carries on.

use super::account::AccountId;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ATM simulator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtmError {
    /// Malformed user input (card number, PIN or amount)
    #[error("Invalid {field}: expected {expected}")]
    InvalidFormat {
        /// Which input was malformed
        field: String,
        /// Human-readable description of the accepted format
        expected: String,
    },

    /// Login against an unknown card, or a card that is already blocked
    #[error("Card does not exist or is blocked")]
    NotFoundOrBlocked,

    /// PIN did not match
    ///
    /// During login `tries_left` holds the attempts remaining in the session.
    #[error("Wrong PIN{}", tries_left.map(|t| format!(". Tries left: {}", t)).unwrap_or_default())]
    WrongPin {
        /// Remaining login attempts (login only)
        tries_left: Option<u32>,
    },

    /// Login attempts exhausted; the card is now blocked
    ///
    /// Terminal for the session: the caller must not offer another attempt.
    #[error("Wrong PIN. The card has been BLOCKED")]
    LockedOut,

    /// Amount is zero or negative after rounding to 2 decimal places
    #[error("Amount must be greater than 0 (got {amount})")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Debit larger than the account balance
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Current balance
        available: Decimal,
        /// Requested debit
        requested: Decimal,
    },

    /// Transfer destination card does not resolve to an account
    #[error("Recipient card {card} does not exist")]
    RecipientNotFound {
        /// The card that was looked up
        card: String,
    },

    /// Transfer destination is the sender's own account
    #[error("Cannot transfer to your own account")]
    SelfTransfer,

    /// New PIN is not exactly 4 decimal digits
    #[error("New PIN must consist of 4 digits")]
    InvalidPin,

    /// Session refers to an account id that is not in the store
    #[error("Account {id} not found")]
    AccountNotFound {
        /// The missing account id
        id: AccountId,
    },

    /// Balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Account involved
        account: AccountId,
    },

    /// A data file or the data directory could not be read or written
    ///
    /// This is a fatal error: the operation did not commit.
    #[error("Storage error at {path}: {message}")]
    Storage {
        /// File or directory involved
        path: String,
        /// Description of the underlying failure
        message: String,
    },

    /// I/O error without a known path
    ///
    /// This is a fatal error.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },

    /// CSV encoding or decoding failed
    ///
    /// This is a fatal error when raised while writing.
    #[error("CSV error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Csv {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the CSV error
        message: String,
    },
}

impl From<std::io::Error> for AtmError {
    fn from(error: std::io::Error) -> Self {
        AtmError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for AtmError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        AtmError::Csv {
            line,
            message: error.to_string(),
        }
    }
}

impl AtmError {
    /// Returns true for storage failures, which abort the program
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AtmError::Storage { .. } | AtmError::Io { .. } | AtmError::Csv { .. }
        )
    }

    /// Returns true if the login session must end (card just got blocked)
    pub fn ends_session(&self) -> bool {
        matches!(self, AtmError::LockedOut)
    }

    /// Create an InvalidFormat error
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        AtmError::InvalidFormat {
            field: field.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create a WrongPin error for a login attempt
    pub fn wrong_pin(tries_left: u32) -> Self {
        AtmError::WrongPin {
            tries_left: Some(tries_left),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(available: Decimal, requested: Decimal) -> Self {
        AtmError::InsufficientFunds {
            available,
            requested,
        }
    }

    /// Create a RecipientNotFound error
    pub fn recipient_not_found(card: &str) -> Self {
        AtmError::RecipientNotFound {
            card: card.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: AccountId) -> Self {
        AtmError::ArithmeticOverflow {
            operation: operation.to_string(),
            account,
        }
    }

    /// Create a Storage error from any displayable cause
    pub fn storage(path: &std::path::Path, cause: impl std::fmt::Display) -> Self {
        AtmError::Storage {
            path: path.display().to_string(),
            message: cause.to_string(),
        }
    }
}
