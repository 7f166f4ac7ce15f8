//! Account store module
//!
//! This module provides the `AccountStore` struct, the sole owner of the
//! account collection and the transaction log.
//!
//! The AccountStore is responsible for:
//! - Creating the data directory and seeding starter accounts on first run
//! - Loading both collections, tolerating damaged files
//! - Looking accounts up by card number or id
//! - Persisting whole collections after every mutation
//! - Providing the lazy, newest-first history scan
//!
//! # Files
//!
//! Two independent files live in the data directory: `accounts.csv` and
//! `transactions.csv`. Each save rewrites the whole file through
//! [`write_atomically`], so a crash never leaves a half-written file.

use crate::core::history::RecentTransactions;
use crate::core::traits::AccountRepository;
use crate::io::csv_format::{
    read_accounts_csv, read_transactions_csv, write_accounts_csv, write_transactions_csv, Loaded,
};
use crate::io::storage::{preserve_copy, write_atomically};
use crate::types::{seed_accounts, Account, AccountId, AtmError, Transaction};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// File name of the account collection inside the data directory
pub const ACCOUNTS_FILE: &str = "accounts.csv";

/// File name of the transaction log inside the data directory
pub const TRANSACTIONS_FILE: &str = "transactions.csv";

/// File-backed store of accounts and transactions
///
/// Holds the authoritative in-memory collections. Mutations go through
/// [`AccountStore::commit`] or [`AccountStore::append_transaction`], which
/// only change the in-memory state once the data files have been written.
#[derive(Debug)]
pub struct AccountStore {
    /// Directory holding both data files
    data_dir: PathBuf,

    /// Accounts in file order
    accounts: Vec<Account>,

    /// Transaction log in chronological (append) order
    transactions: Vec<Transaction>,
}

impl AccountStore {
    /// Create an empty store bound to `data_dir`
    ///
    /// Nothing is read or written until [`AccountStore::initialize`] is called.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        AccountStore {
            data_dir: data_dir.into(),
            accounts: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Create a store bound to `data_dir` and initialize it
    ///
    /// # Errors
    ///
    /// Returns a fatal `AtmError::Storage` if the directory cannot be created
    /// or the seed files cannot be written.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, AtmError> {
        let mut store = AccountStore::new(data_dir);
        store.initialize()?;
        Ok(store)
    }

    /// Prepare the data directory and load both collections
    ///
    /// - Creates the data directory if it does not exist
    /// - Seeds the three starter accounts if there is no account file
    /// - Creates an empty transaction log if there is no transaction file
    /// - Otherwise loads the existing files
    ///
    /// A damaged file never aborts initialization: malformed rows are skipped,
    /// an unreadable file yields an empty collection, and a copy of the
    /// original file is kept next to it with a `.bak` suffix.
    ///
    /// # Errors
    ///
    /// Returns a fatal error only if the directory or a new file cannot be written.
    pub fn initialize(&mut self) -> Result<(), AtmError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| AtmError::storage(&self.data_dir, e))?;

        let accounts_path = self.accounts_path();
        if accounts_path.exists() {
            self.accounts = load_file(&accounts_path, read_accounts_csv);
            log::info!(
                "Loaded {} accounts from {}",
                self.accounts.len(),
                accounts_path.display()
            );
        } else {
            log::info!("No account data found, seeding starter accounts");
            self.accounts = seed_accounts();
            self.persist_accounts()?;
        }

        let transactions_path = self.transactions_path();
        if transactions_path.exists() {
            self.transactions = load_file(&transactions_path, read_transactions_csv);
            log::info!(
                "Loaded {} transactions from {}",
                self.transactions.len(),
                transactions_path.display()
            );
        } else {
            log::info!("No transaction log found, starting an empty one");
            self.transactions = Vec::new();
            self.persist_transactions()?;
        }

        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.data_dir.join(ACCOUNTS_FILE)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(TRANSACTIONS_FILE)
    }

    /// All accounts in file order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// The whole transaction log, oldest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Find the first account with the given card number
    pub fn find_by_card(&self, card: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.card == card)
    }

    /// Find the first account with the given id
    pub fn find_by_id(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    /// Write the whole account collection, replacing the previous file
    pub fn persist_accounts(&self) -> Result<(), AtmError> {
        save_accounts(&self.accounts_path(), &self.accounts)
    }

    /// Write the whole transaction log, replacing the previous file
    pub fn persist_transactions(&self) -> Result<(), AtmError> {
        save_transactions(&self.transactions_path(), &self.transactions)
    }

    /// Append a transaction and immediately persist the whole log
    ///
    /// # Errors
    ///
    /// Returns a fatal storage error if the log cannot be written; the
    /// transaction is then not kept in memory either.
    pub fn append_transaction(&mut self, tx: Transaction) -> Result<(), AtmError> {
        self.transactions.push(tx);

        if let Err(e) = self.persist_transactions() {
            self.transactions.pop();
            return Err(e);
        }

        Ok(())
    }

    /// Newest-first transactions related to `account`, at most `limit` of them
    ///
    /// The returned iterator is lazy; call again to rescan the current log.
    pub fn recent_transactions_for(&self, account: AccountId, limit: usize) -> RecentTransactions<'_> {
        RecentTransactions::new(&self.transactions, account, limit)
    }

    /// Durably apply account updates and an optional new transaction as one unit
    ///
    /// The updated accounts replace the stored ones with the same id. The new
    /// account collection is written first, then the extended log; only when
    /// both writes succeeded is the in-memory state replaced.
    ///
    /// # Arguments
    ///
    /// * `updates` - New versions of existing accounts
    /// * `transaction` - Log entry describing the change, if any
    ///
    /// # Errors
    ///
    /// - `AtmError::AccountNotFound` if an update refers to an unknown id
    ///   (nothing is written)
    /// - A fatal storage error if a write fails. If the log write fails after
    ///   the accounts were written, the account file is rewritten from the
    ///   unchanged in-memory state.
    pub fn commit(
        &mut self,
        updates: Vec<Account>,
        transaction: Option<Transaction>,
    ) -> Result<(), AtmError> {
        let mut staged = self.accounts.clone();
        for updated in &updates {
            let slot = staged
                .iter_mut()
                .find(|account| account.id == updated.id)
                .ok_or(AtmError::AccountNotFound { id: updated.id })?;
            *slot = updated.clone();
        }

        let accounts_path = self.accounts_path();
        if !updates.is_empty() {
            save_accounts(&accounts_path, &staged)?;
        }

        if let Some(tx) = transaction {
            if let Err(e) = self.append_transaction(tx) {
                if !updates.is_empty() {
                    if let Err(rollback) = self.persist_accounts() {
                        log::error!(
                            "Could not restore {} after a failed log write: {}",
                            accounts_path.display(),
                            rollback
                        );
                    }
                }
                return Err(e);
            }
        }

        self.accounts = staged;
        Ok(())
    }
}

impl AccountRepository for AccountStore {
    fn find_by_card(&self, card: &str) -> Option<&Account> {
        AccountStore::find_by_card(self, card)
    }

    fn find_by_id(&self, id: AccountId) -> Option<&Account> {
        AccountStore::find_by_id(self, id)
    }

    fn commit(
        &mut self,
        accounts: Vec<Account>,
        transaction: Option<Transaction>,
    ) -> Result<(), AtmError> {
        AccountStore::commit(self, accounts, transaction)
    }

    fn recent_transactions_for(&self, account: AccountId, limit: usize) -> RecentTransactions<'_> {
        AccountStore::recent_transactions_for(self, account, limit)
    }
}

fn save_accounts(path: &Path, accounts: &[Account]) -> Result<(), AtmError> {
    write_atomically(path, |out| write_accounts_csv(accounts, out))
}

fn save_transactions(path: &Path, transactions: &[Transaction]) -> Result<(), AtmError> {
    write_atomically(path, |out| write_transactions_csv(transactions, out))
}

/// Read a data file, falling back to whatever could be recovered
fn load_file<T, F>(path: &Path, read: F) -> Vec<T>
where
    F: FnOnce(File) -> Loaded<T>,
{
    let loaded = match File::open(path) {
        Ok(file) => read(file),
        Err(e) => {
            log::warn!(
                "Cannot read {}: {}; continuing with an empty collection",
                path.display(),
                e
            );
            keep_damaged_copy(path);
            return Vec::new();
        }
    };

    if !loaded.is_clean() {
        for reason in &loaded.rejected {
            log::warn!("Skipped record in {}: {}", path.display(), reason);
        }
        keep_damaged_copy(path);
    }

    loaded.records
}

fn keep_damaged_copy(path: &Path) {
    match preserve_copy(path) {
        Ok(backup) => log::warn!("Kept a copy of the damaged file at {}", backup.display()),
        Err(e) => log::warn!("Could not keep a copy of {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn at(offset: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
    }

    fn open_fresh() -> (TempDir, AccountStore) {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_new_store_is_empty_until_initialized() {
        let dir = TempDir::new().unwrap();
        let store = AccountStore::new(dir.path().join("data"));

        assert!(store.accounts().is_empty());
        assert!(!store.data_dir().exists());
    }

    #[test]
    fn test_initialize_seeds_fresh_directory() {
        let (_dir, store) = open_fresh();

        assert!(store.data_dir().is_dir());
        assert!(store.accounts_path().is_file());
        assert!(store.transactions_path().is_file());
        assert_eq!(store.accounts(), seed_accounts().as_slice());
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_initialize_loads_existing_data_instead_of_seeding() {
        let (dir, mut store) = open_fresh();

        let mut liza = store.find_by_id(1).unwrap().clone();
        liza.balance = Decimal::new(175050, 2);
        let tx = Transaction::deposit(at(0), 1, Decimal::new(25050, 2), liza.balance);
        store.commit(vec![liza.clone()], Some(tx.clone())).unwrap();

        let reopened = AccountStore::open(dir.path().join("data")).unwrap();
        assert_eq!(reopened.find_by_id(1), Some(&liza));
        assert_eq!(reopened.transactions(), &[tx]);
    }

    #[test]
    fn test_persist_then_reload_is_identical() {
        let (dir, mut store) = open_fresh();
        store.accounts[1].blocked = true;
        store.accounts[2].pin = "4321".to_string();
        store.persist_accounts().unwrap();
        store
            .append_transaction(Transaction::change_pin(at(0), 3, Decimal::new(20000, 2)))
            .unwrap();

        let reopened = AccountStore::open(dir.path().join("data")).unwrap();
        assert_eq!(reopened.accounts(), store.accounts());
        assert_eq!(reopened.transactions(), store.transactions());
    }

    #[test]
    fn test_damaged_account_file_falls_back_and_keeps_copy() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let garbage = "this is,not\nan account,file\n";
        fs::write(data_dir.join(ACCOUNTS_FILE), garbage).unwrap();

        let store = AccountStore::open(&data_dir).unwrap();

        assert!(store.accounts().is_empty());
        let backup = data_dir.join("accounts.csv.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), garbage);
    }

    #[test]
    fn test_partially_damaged_log_keeps_valid_rows() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(
            data_dir.join(TRANSACTIONS_FILE),
            "time,fromId,toId,type,amount,balanceAfter,note\n\
             2024-01-01T10:00:00Z,1,,DEPOSIT,10.00,1510.00,Cash deposit\n\
             broken row\n",
        )
        .unwrap();

        let store = AccountStore::open(&data_dir).unwrap();

        assert_eq!(store.accounts().len(), 3);
        assert_eq!(store.transactions().len(), 1);
        assert!(data_dir.join("transactions.csv.bak").exists());
    }

    #[test]
    fn test_find_by_card_and_id() {
        let (_dir, store) = open_fresh();

        assert_eq!(store.find_by_card("5555666677778888").map(|a| a.id), Some(2));
        assert_eq!(store.find_by_id(3).map(|a| a.owner.as_str()), Some("Ola"));
        assert!(store.find_by_card("0000000000000000").is_none());
        assert!(store.find_by_id(99).is_none());
    }

    #[test]
    fn test_append_transaction_persists_immediately() {
        let (_dir, mut store) = open_fresh();

        let tx = Transaction::withdraw(at(0), 2, Decimal::new(1000, 2), Decimal::new(49000, 2));
        store.append_transaction(tx.clone()).unwrap();

        let on_disk = read_transactions_csv(File::open(store.transactions_path()).unwrap());
        assert_eq!(on_disk.records, vec![tx]);
    }

    #[test]
    fn test_append_transaction_failure_keeps_log_unchanged() {
        let (_dir, mut store) = open_fresh();
        fs::remove_dir_all(store.data_dir()).unwrap();

        let tx = Transaction::deposit(at(0), 1, Decimal::ONE, Decimal::ONE);
        let error = store.append_transaction(tx).unwrap_err();

        assert!(error.is_fatal());
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_commit_applies_both_updates_together() {
        let (_dir, mut store) = open_fresh();

        let mut from = store.find_by_id(1).unwrap().clone();
        let mut to = store.find_by_id(2).unwrap().clone();
        from.balance = Decimal::new(120000, 2);
        to.balance = Decimal::new(80000, 2);
        let tx = Transaction::transfer(at(0), 1, 2, &to.card, Decimal::new(30000, 2), from.balance);

        store.commit(vec![from, to], Some(tx)).unwrap();

        assert_eq!(store.find_by_id(1).unwrap().balance, Decimal::new(120000, 2));
        assert_eq!(store.find_by_id(2).unwrap().balance, Decimal::new(80000, 2));
        assert_eq!(store.transactions().len(), 1);
    }

    #[test]
    fn test_commit_unknown_account_changes_nothing() {
        let (_dir, mut store) = open_fresh();
        let before = fs::read_to_string(store.accounts_path()).unwrap();

        let ghost = Account::new(42, "Ghost", "4242424242424242", "4242", Decimal::ONE);
        let tx = Transaction::deposit(at(0), 42, Decimal::ONE, Decimal::ONE);
        let error = store.commit(vec![ghost], Some(tx)).unwrap_err();

        assert_eq!(error, AtmError::AccountNotFound { id: 42 });
        assert!(store.transactions().is_empty());
        assert_eq!(fs::read_to_string(store.accounts_path()).unwrap(), before);
    }

    #[test]
    fn test_commit_failure_keeps_memory_unchanged() {
        let (_dir, mut store) = open_fresh();
        fs::remove_dir_all(store.data_dir()).unwrap();

        let mut liza = store.find_by_id(1).unwrap().clone();
        liza.balance = Decimal::ZERO;
        let tx = Transaction::withdraw(at(0), 1, Decimal::new(150000, 2), Decimal::ZERO);
        let error = store.commit(vec![liza], Some(tx)).unwrap_err();

        assert!(error.is_fatal());
        assert_eq!(store.find_by_id(1).unwrap().balance, Decimal::new(150000, 2));
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_log_write_failure_restores_account_file() {
        let (_dir, mut store) = open_fresh();
        let accounts_before = fs::read(store.accounts_path()).unwrap();

        // A non-empty directory in place of the log makes the rename fail
        // after the account file has already been replaced
        let log_path = store.transactions_path();
        fs::remove_file(&log_path).unwrap();
        fs::create_dir(&log_path).unwrap();
        fs::write(log_path.join("keep"), "x").unwrap();

        let mut from = store.find_by_id(1).unwrap().clone();
        let mut to = store.find_by_id(2).unwrap().clone();
        from.balance = Decimal::new(120000, 2);
        to.balance = Decimal::new(80000, 2);
        let tx = Transaction::transfer(at(0), 1, 2, &to.card, Decimal::new(30000, 2), from.balance);

        let error = store.commit(vec![from, to], Some(tx)).unwrap_err();

        assert!(error.is_fatal());
        assert_eq!(fs::read(store.accounts_path()).unwrap(), accounts_before);
        assert_eq!(store.find_by_id(1).unwrap().balance, Decimal::new(150000, 2));
        assert_eq!(store.find_by_id(2).unwrap().balance, Decimal::new(50000, 2));
        assert!(store.transactions().is_empty());
    }

    #[test]
    fn test_recent_transactions_for_delegates_to_log() {
        let (_dir, mut store) = open_fresh();
        store
            .append_transaction(Transaction::deposit(at(0), 1, Decimal::ONE, Decimal::ONE))
            .unwrap();
        store
            .append_transaction(Transaction::deposit(at(1), 2, Decimal::ONE, Decimal::ONE))
            .unwrap();
        store
            .append_transaction(Transaction::withdraw(at(2), 1, Decimal::ONE, Decimal::ZERO))
            .unwrap();

        let times: Vec<_> = store.recent_transactions_for(1, 10).map(|t| t.time).collect();
        assert_eq!(times, vec![at(2), at(0)]);

        // A fresh scan sees entries appended since the previous one
        store
            .append_transaction(Transaction::change_pin(at(3), 1, Decimal::ZERO))
            .unwrap();
        assert_eq!(store.recent_transactions_for(1, 1).next().unwrap().time, at(3));
    }
}
