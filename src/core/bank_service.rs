//! Banking service module
//!
//! This module provides the `BankService` struct which enforces every
//! authentication and money-movement rule of the ATM.
//!
//! The BankService is responsible for:
//! - Authenticating a card and PIN, blocking the card after too many wrong PINs
//! - Validating and applying deposits, withdrawals and transfers
//! - Changing the PIN
//! - Recording one transaction per successful mutating operation
//!
//! Every mutation is staged on copies of the affected accounts and handed to
//! [`AccountRepository::commit`]; a failed operation therefore never leaves a
//! partial change behind.

use crate::core::account_store::AccountStore;
use crate::core::history::RecentTransactions;
use crate::core::traits::AccountRepository;
use crate::types::{
    format_amount, is_valid_card, is_valid_pin, normalize_amount, Account, AccountId, AtmError,
    Transaction, CURRENCY,
};
use chrono::Utc;
use rust_decimal::Decimal;

/// Wrong PIN entries allowed per login session by default
pub const DEFAULT_MAX_LOGIN_TRIES: u32 = 3;

/// Number of history entries shown by default
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Tunable limits of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankConfig {
    /// Wrong PIN entries before the card is blocked (at least 1)
    pub max_login_tries: u32,

    /// Number of transactions shown in the history view (at least 1)
    pub history_limit: usize,
}

impl Default for BankConfig {
    fn default() -> Self {
        BankConfig {
            max_login_tries: DEFAULT_MAX_LOGIN_TRIES,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Remaining PIN attempts of one login session
///
/// The counter lives with the login screen, not with an account, and is
/// never persisted. Every wrong PIN consumes one try; a successful login
/// resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginAttempts {
    max_tries: u32,
    tries_left: u32,
}

impl LoginAttempts {
    pub fn new(max_tries: u32) -> Self {
        LoginAttempts {
            max_tries,
            tries_left: max_tries,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.tries_left
    }

    pub fn is_exhausted(&self) -> bool {
        self.tries_left == 0
    }

    pub fn reset(&mut self) {
        self.tries_left = self.max_tries;
    }

    /// Use up one try and return how many are left
    fn consume(&mut self) -> u32 {
        self.tries_left = self.tries_left.saturating_sub(1);
        self.tries_left
    }
}

/// Outcome of a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct LoginSuccess {
    /// Snapshot of the authenticated account
    pub account: Account,

    /// Welcome text for the cardholder
    pub message: String,
}

/// Outcome of a successful account operation
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// Human-readable confirmation
    pub message: String,

    /// Balance of the operating account after the operation
    pub balance: Decimal,
}

/// ATM business logic on top of an account repository
///
/// The service owns its repository, so it is the only writer for the
/// lifetime of the program.
pub struct BankService<R: AccountRepository = AccountStore> {
    /// Authoritative accounts and transaction log
    repo: R,

    /// Login and history limits
    config: BankConfig,
}

impl<R: AccountRepository> BankService<R> {
    /// Create a new BankService over an initialized repository
    pub fn new(repo: R, config: BankConfig) -> Self {
        BankService { repo, config }
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Fresh attempt counter for a new login screen
    pub fn new_attempts(&self) -> LoginAttempts {
        LoginAttempts::new(self.config.max_login_tries)
    }

    /// Current state of an account
    ///
    /// # Errors
    ///
    /// Returns `AtmError::AccountNotFound` if the id is not in the repository.
    pub fn account(&self, id: AccountId) -> Result<&Account, AtmError> {
        self.repo
            .find_by_id(id)
            .ok_or(AtmError::AccountNotFound { id })
    }

    /// Authenticate a card and PIN
    ///
    /// # Arguments
    ///
    /// * `card` - Card number as typed (16 digits)
    /// * `pin` - PIN as typed (4 digits)
    /// * `attempts` - Attempt counter of the current login screen
    ///
    /// # Returns
    ///
    /// * `Ok(LoginSuccess)` - PIN matched; `attempts` is reset
    /// * `Err(AtmError)` - Login refused
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the card or PIN is malformed (no try is consumed)
    /// - `LockedOut` if `attempts` is already exhausted
    /// - `NotFoundOrBlocked` if no unblocked account has this card
    /// - `WrongPin` with the remaining tries after a mismatch
    /// - `LockedOut` when the mismatch used the last try; the card is then
    ///   blocked and the block is persisted
    /// - A fatal storage error if the block cannot be persisted
    pub fn login(
        &mut self,
        card: &str,
        pin: &str,
        attempts: &mut LoginAttempts,
    ) -> Result<LoginSuccess, AtmError> {
        if !is_valid_card(card) {
            return Err(AtmError::invalid_format("card number", "16 digits"));
        }
        if !is_valid_pin(pin) {
            return Err(AtmError::invalid_format("PIN", "4 digits"));
        }
        if attempts.is_exhausted() {
            return Err(AtmError::LockedOut);
        }

        let account = self
            .repo
            .find_by_card(card)
            .filter(|account| !account.blocked)
            .cloned()
            .ok_or(AtmError::NotFoundOrBlocked)?;

        if !account.pin_matches(pin) {
            let tries_left = attempts.consume();

            if tries_left == 0 {
                let mut blocked = account;
                blocked.blocked = true;
                let id = blocked.id;
                self.repo.commit(vec![blocked], None)?;
                log::warn!("Account {} blocked after too many wrong PINs", id);
                return Err(AtmError::LockedOut);
            }

            log::warn!(
                "Wrong PIN for account {}, {} tries left",
                account.id,
                tries_left
            );
            return Err(AtmError::wrong_pin(tries_left));
        }

        attempts.reset();
        log::debug!("Account {} logged in", account.id);

        let message = format!("Logged in. Welcome, {}!", account.owner);
        Ok(LoginSuccess { account, message })
    }

    /// Deposit cash into an account
    ///
    /// The amount is rounded to 2 decimal places before validation.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the id is unknown
    /// - `InvalidAmount` if the rounded amount is not positive
    /// - `ArithmeticOverflow` if the new balance is not representable
    /// - A fatal storage error if the change cannot be persisted
    pub fn deposit(&mut self, account: AccountId, amount: Decimal) -> Result<Receipt, AtmError> {
        let mut updated = self.account(account)?.clone();
        let amount = positive_amount(amount)?;

        updated.balance = updated
            .balance
            .checked_add(amount)
            .ok_or_else(|| AtmError::arithmetic_overflow("deposit", account))?;

        let balance = updated.balance;
        let tx = Transaction::deposit(Utc::now(), account, amount, balance);
        self.repo.commit(vec![updated], Some(tx))?;

        log::debug!("Deposited {} into account {}", amount, account);
        Ok(Receipt {
            message: format!(
                "Deposited {} {}. New balance: {} {}",
                format_amount(amount),
                CURRENCY,
                format_amount(balance),
                CURRENCY
            ),
            balance,
        })
    }

    /// Withdraw cash from an account
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the id is unknown
    /// - `InvalidAmount` if the rounded amount is not positive
    /// - `InsufficientFunds` if the amount exceeds the balance
    /// - A fatal storage error if the change cannot be persisted
    pub fn withdraw(&mut self, account: AccountId, amount: Decimal) -> Result<Receipt, AtmError> {
        let mut updated = self.account(account)?.clone();
        let amount = positive_amount(amount)?;

        if amount > updated.balance {
            return Err(AtmError::insufficient_funds(updated.balance, amount));
        }

        updated.balance = updated
            .balance
            .checked_sub(amount)
            .ok_or_else(|| AtmError::arithmetic_overflow("withdraw", account))?;

        let balance = updated.balance;
        let tx = Transaction::withdraw(Utc::now(), account, amount, balance);
        self.repo.commit(vec![updated], Some(tx))?;

        log::debug!("Withdrew {} from account {}", amount, account);
        Ok(Receipt {
            message: format!(
                "Withdrew {} {}. New balance: {} {}",
                format_amount(amount),
                CURRENCY,
                format_amount(balance),
                CURRENCY
            ),
            balance,
        })
    }

    /// Transfer funds to the account holding `to_card`
    ///
    /// Checks run in this order: recipient exists, recipient is not the
    /// sender, amount is positive, sender has enough funds. Both balance
    /// changes and the single TRANSFER entry are committed together.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the sender id is unknown
    /// - `RecipientNotFound`, `SelfTransfer`, `InvalidAmount`,
    ///   `InsufficientFunds` as listed above
    /// - `ArithmeticOverflow` if the recipient balance is not representable
    /// - A fatal storage error if the change cannot be persisted
    pub fn transfer(
        &mut self,
        from: AccountId,
        to_card: &str,
        amount: Decimal,
    ) -> Result<Receipt, AtmError> {
        let mut sender = self.account(from)?.clone();
        let mut recipient = self
            .repo
            .find_by_card(to_card)
            .cloned()
            .ok_or_else(|| AtmError::recipient_not_found(to_card))?;

        if recipient.id == sender.id {
            return Err(AtmError::SelfTransfer);
        }

        let amount = positive_amount(amount)?;
        if amount > sender.balance {
            return Err(AtmError::insufficient_funds(sender.balance, amount));
        }

        sender.balance = sender
            .balance
            .checked_sub(amount)
            .ok_or_else(|| AtmError::arithmetic_overflow("transfer", sender.id))?;
        recipient.balance = recipient
            .balance
            .checked_add(amount)
            .ok_or_else(|| AtmError::arithmetic_overflow("transfer", recipient.id))?;

        let balance = sender.balance;
        let message = format!(
            "Transferred {} {} to {}. Your balance: {} {}",
            format_amount(amount),
            CURRENCY,
            recipient.owner,
            format_amount(balance),
            CURRENCY
        );
        let tx = Transaction::transfer(
            Utc::now(),
            sender.id,
            recipient.id,
            &recipient.card,
            amount,
            balance,
        );
        let to = recipient.id;
        self.repo.commit(vec![sender, recipient], Some(tx))?;

        log::debug!("Transferred {} from account {} to account {}", amount, from, to);
        Ok(Receipt { message, balance })
    }

    /// Replace the PIN of an account
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the id is unknown
    /// - `WrongPin` (without a try count) if `old_pin` does not match
    /// - `InvalidPin` if `new_pin` is not exactly 4 digits
    /// - A fatal storage error if the change cannot be persisted
    pub fn change_pin(
        &mut self,
        account: AccountId,
        old_pin: &str,
        new_pin: &str,
    ) -> Result<Receipt, AtmError> {
        let mut updated = self.account(account)?.clone();

        if !updated.pin_matches(old_pin) {
            return Err(AtmError::WrongPin { tries_left: None });
        }
        if !is_valid_pin(new_pin) {
            return Err(AtmError::InvalidPin);
        }

        updated.pin = new_pin.to_string();
        let balance = updated.balance;
        let tx = Transaction::change_pin(Utc::now(), account, balance);
        self.repo.commit(vec![updated], Some(tx))?;

        log::debug!("Changed PIN of account {}", account);
        Ok(Receipt {
            message: "PIN has been changed.".to_string(),
            balance,
        })
    }

    /// Newest-first transactions related to an account, at most `limit`
    pub fn recent_transactions(&self, account: AccountId, limit: usize) -> RecentTransactions<'_> {
        self.repo.recent_transactions_for(account, limit)
    }
}

/// Round an amount and require it to be greater than zero
fn positive_amount(amount: Decimal) -> Result<Decimal, AtmError> {
    let amount = normalize_amount(amount);
    if amount <= Decimal::ZERO {
        return Err(AtmError::InvalidAmount { amount });
    }
    Ok(amount)
}
