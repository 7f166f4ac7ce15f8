//! Account-related types for the ATM simulator
//!
//! This module defines the Account structure, the card/PIN format rules,
//! and the starter accounts used when no account storage exists yet.

use rust_decimal::Decimal;

/// Account identifier
///
/// Assigned once when the account is created and never reused.
pub type AccountId = u32;

/// Number of decimal digits in a card number
pub const CARD_LENGTH: usize = 16;

/// Number of decimal digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Bank account backing a card
///
/// The balance is kept with 2 fractional digits and must never go negative
/// as a result of any operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Stable, unique identifier
    pub id: AccountId,

    /// Display name of the cardholder (non-empty)
    pub owner: String,

    /// Card number: exactly 16 decimal digits, unique across accounts
    pub card: String,

    /// Secret credential: exactly 4 decimal digits
    pub pin: String,

    /// Available funds, fixed-point with 2 decimal places
    pub balance: Decimal,

    /// Whether the card has been blocked after exhausting PIN attempts
    ///
    /// There is no unblock operation; a blocked account rejects every login.
    pub blocked: bool,
}

impl Account {
    /// Create an unblocked account
    pub fn new(
        id: AccountId,
        owner: impl Into<String>,
        card: impl Into<String>,
        pin: impl Into<String>,
        balance: Decimal,
    ) -> Self {
        Account {
            id,
            owner: owner.into(),
            card: card.into(),
            pin: pin.into(),
            balance,
            blocked: false,
        }
    }

    /// Check a PIN candidate against the stored credential
    pub fn pin_matches(&self, pin: &str) -> bool {
        self.pin == pin
    }
}

/// Starter accounts written on the very first run
///
/// # Returns
///
/// Three unblocked accounts with ids 1-3 and balances 1500.00, 500.00 and 200.00
pub fn seed_accounts() -> Vec<Account> {
    vec![
        Account::new(1, "Liza", "1111222233334444", "1234", Decimal::new(150000, 2)),
        Account::new(2, "Anna", "5555666677778888", "5678", Decimal::new(50000, 2)),
        Account::new(3, "Ola", "9999000011112222", "0000", Decimal::new(20000, 2)),
    ]
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Returns true if `card` is exactly 16 ASCII decimal digits
pub fn is_valid_card(card: &str) -> bool {
    is_digits(card, CARD_LENGTH)
}

/// Returns true if `pin` is exactly 4 ASCII decimal digits
pub fn is_valid_pin(pin: &str) -> bool {
    is_digits(pin, PIN_LENGTH)
}
