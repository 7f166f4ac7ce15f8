//! Output formatting utilities

use crate::types::{format_amount, Account, Transaction, CURRENCY};
use chrono::Local;
use colored::Colorize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print the session header with owner and current balance
pub fn header(account: &Account) {
    println!();
    println!("{}", session_header(account).bold());
}

/// Header text for the signed-in account
pub fn session_header(account: &Account) -> String {
    format!(
        "{} | Balance: {} {}",
        account.owner,
        format_amount(account.balance),
        CURRENCY
    )
}

/// One history row: local time, type, amount, note and balance after
pub fn format_history_line(tx: &Transaction) -> String {
    format!(
        "{}  {:<10}  {:>10} {}  {:<28}  balance {} {}",
        tx.time.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        tx.tx_type.as_str(),
        format_amount(tx.amount),
        CURRENCY,
        tx.note,
        format_amount(tx.balance_after),
        CURRENCY
    )
}
