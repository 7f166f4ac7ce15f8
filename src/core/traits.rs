//! Core trait for account persistence
//!
//! This module defines the seam between the banking service and the storage
//! that owns accounts and the transaction log.

use crate::core::history::RecentTransactions;
use crate::types::{Account, AccountId, AtmError, Transaction};

/// Trait for the authoritative account and transaction collections
///
/// The banking service reads entities through this trait and hands every
/// mutation back through [`AccountRepository::commit`], so an implementation
/// decides how to make the change durable.
pub trait AccountRepository {
    /// First account whose card equals `card`
    fn find_by_card(&self, card: &str) -> Option<&Account>;

    /// First account whose id equals `id`
    fn find_by_id(&self, id: AccountId) -> Option<&Account>;

    /// Durably replace the given accounts (matched by id) and append `transaction`
    ///
    /// Either everything is persisted and becomes visible, or an error is
    /// returned and the visible state is unchanged.
    fn commit(
        &mut self,
        accounts: Vec<Account>,
        transaction: Option<Transaction>,
    ) -> Result<(), AtmError>;

    /// Most-recent-first scan of the transactions related to `account`
    fn recent_transactions_for(&self, account: AccountId, limit: usize) -> RecentTransactions<'_>;
}
