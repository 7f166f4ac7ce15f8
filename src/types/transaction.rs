//! Transaction-related types for the ATM simulator
//!
//! This module defines the append-only log entries produced by every
//! successful mutating operation.

use super::account::AccountId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of operation recorded in the transaction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Cash credited to an account
    Deposit,

    /// Cash debited from an account
    Withdraw,

    /// Funds moved from one account to another
    Transfer,

    /// PIN replaced; moves no money
    ChangePin,
}

impl TransactionType {
    /// Upper-case name as persisted
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::ChangePin => "CHANGE_PIN",
        }
    }
}

/// Immutable entry of the transaction log
///
/// `balance_after` always refers to the `from_id` account. Entries are never
/// modified once appended and the log order is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Commit time of the operation
    pub time: DateTime<Utc>,

    /// Account whose balance decreased or whose PIN changed
    pub from_id: Option<AccountId>,

    /// Credited counterparty (transfers only)
    pub to_id: Option<AccountId>,

    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Amount moved (zero for PIN changes)
    pub amount: Decimal,

    /// Balance of the `from_id` account right after the operation
    pub balance_after: Decimal,

    /// Free-text annotation
    pub note: String,
}

impl Transaction {
    pub fn deposit(time: DateTime<Utc>, account: AccountId, amount: Decimal, balance_after: Decimal) -> Self {
        Transaction {
            time,
            from_id: Some(account),
            to_id: None,
            tx_type: TransactionType::Deposit,
            amount,
            balance_after,
            note: "Cash deposit".to_string(),
        }
    }

    pub fn withdraw(time: DateTime<Utc>, account: AccountId, amount: Decimal, balance_after: Decimal) -> Self {
        Transaction {
            time,
            from_id: Some(account),
            to_id: None,
            tx_type: TransactionType::Withdraw,
            amount,
            balance_after,
            note: "Cash withdrawal".to_string(),
        }
    }

    pub fn transfer(
        time: DateTime<Utc>,
        from: AccountId,
        to: AccountId,
        to_card: &str,
        amount: Decimal,
        balance_after: Decimal,
    ) -> Self {
        Transaction {
            time,
            from_id: Some(from),
            to_id: Some(to),
            tx_type: TransactionType::Transfer,
            amount,
            balance_after,
            note: format!("to card {}", to_card),
        }
    }

    pub fn change_pin(time: DateTime<Utc>, account: AccountId, balance: Decimal) -> Self {
        Transaction {
            time,
            from_id: Some(account),
            to_id: None,
            tx_type: TransactionType::ChangePin,
            amount: Decimal::ZERO,
            balance_after: balance,
            note: "PIN change".to_string(),
        }
    }

    /// Returns true if the account is either side of this transaction
    pub fn is_related_to(&self, account: AccountId) -> bool {
        self.from_id == Some(account) || self.to_id == Some(account)
    }
}
