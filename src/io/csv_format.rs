//! CSV format handling for the persisted account and transaction files
//!
//! This module centralizes all on-disk format concerns, providing:
//! - AccountRow structure for (de)serialization of `accounts.csv`
//! - Conversion from rows to validated domain accounts
//! - Readers that skip malformed rows instead of failing the whole file
//! - Writers that always emit a header, even for an empty collection
//!
//! All functions work on `Read`/`Write` handles (no path handling) for easy testing.

use crate::types::{
    is_valid_card, is_valid_pin, normalize_amount, Account, AccountId, AtmError, Transaction,
};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{Read, Write};
use std::str::FromStr;

/// Column names of `accounts.csv`
pub const ACCOUNT_HEADERS: [&str; 6] = ["id", "owner", "card", "pin", "balance", "blocked"];

/// Column names of `transactions.csv`
pub const TRANSACTION_HEADERS: [&str; 7] = [
    "time",
    "fromId",
    "toId",
    "type",
    "amount",
    "balanceAfter",
    "note",
];

/// Raw row of `accounts.csv`
///
/// The balance is kept as a string so a malformed value is reported with
/// the row instead of failing deserialization of the whole record.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AccountRow {
    pub id: AccountId,
    pub owner: String,
    pub card: String,
    pub pin: String,
    pub balance: String,
    pub blocked: bool,
}

impl From<&Account> for AccountRow {
    fn from(account: &Account) -> Self {
        AccountRow {
            id: account.id,
            owner: account.owner.clone(),
            card: account.card.clone(),
            pin: account.pin.clone(),
            balance: format!("{:.2}", account.balance),
            blocked: account.blocked,
        }
    }
}

/// Result of reading a persisted collection
///
/// `rejected` holds one message per skipped row; an empty list means the
/// file was read in full.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub rejected: Vec<String>,
}

impl<T> Loaded<T> {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Convert an AccountRow to an Account
///
/// This function:
/// - Requires a non-empty owner
/// - Requires a 16-digit card and a 4-digit PIN
/// - Parses the balance and rejects negative values
/// - Normalizes the balance to 2 decimal places
pub fn convert_account_row(row: AccountRow) -> Result<Account, String> {
    if row.owner.trim().is_empty() {
        return Err(format!("Account {} has an empty owner", row.id));
    }

    if !is_valid_card(&row.card) {
        return Err(format!("Account {} has a malformed card number", row.id));
    }

    // The PIN value itself is never echoed
    if !is_valid_pin(&row.pin) {
        return Err(format!("Account {} has a malformed PIN", row.id));
    }

    let balance = Decimal::from_str(row.balance.trim())
        .map_err(|_| format!("Account {} has an invalid balance '{}'", row.id, row.balance))?;

    if balance.is_sign_negative() && !balance.is_zero() {
        return Err(format!("Account {} has a negative balance {}", row.id, balance));
    }

    Ok(Account {
        id: row.id,
        owner: row.owner,
        card: row.card,
        pin: row.pin,
        balance: normalize_amount(balance),
        blocked: row.blocked,
    })
}

fn build_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input)
}

/// Read accounts, skipping malformed and duplicate rows
///
/// A row repeating an id or card that was already loaded is rejected;
/// the first occurrence wins.
pub fn read_accounts_csv<R: Read>(input: R) -> Loaded<Account> {
    let mut reader = build_reader(input);
    let mut records = Vec::new();
    let mut rejected = Vec::new();
    let mut seen_ids = HashSet::new();
    let mut seen_cards = HashSet::new();

    for (index, result) in reader.deserialize::<AccountRow>().enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line = index + 2;

        let row = match result {
            Ok(row) => row,
            // The underlying reader failed; nothing further can be read
            Err(e) if e.is_io_error() => {
                rejected.push(format!("Line {}: {}", line, e));
                break;
            }
            Err(e) => {
                rejected.push(format!("Line {}: {}", line, e));
                continue;
            }
        };

        let account = match convert_account_row(row) {
            Ok(account) => account,
            Err(e) => {
                rejected.push(format!("Line {}: {}", line, e));
                continue;
            }
        };

        if !seen_ids.insert(account.id) {
            rejected.push(format!("Line {}: duplicate account id {}", line, account.id));
            continue;
        }

        if !seen_cards.insert(account.card.clone()) {
            rejected.push(format!(
                "Line {}: card of account {} is already used by another account",
                line, account.id
            ));
            continue;
        }

        records.push(account);
    }

    Loaded { records, rejected }
}

/// Read the transaction log, skipping malformed rows
pub fn read_transactions_csv<R: Read>(input: R) -> Loaded<Transaction> {
    let mut reader = build_reader(input);
    let mut records = Vec::new();
    let mut rejected = Vec::new();

    for (index, result) in reader.deserialize::<Transaction>().enumerate() {
        match result {
            Ok(tx) => records.push(tx),
            Err(e) => {
                let stop = e.is_io_error();
                rejected.push(format!("Line {}: {}", index + 2, e));
                if stop {
                    break;
                }
            }
        }
    }

    Loaded { records, rejected }
}

/// Write accounts in CSV format
///
/// Writes the header followed by one row per account, in collection order.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), AtmError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);

    writer.write_record(ACCOUNT_HEADERS)?;
    for account in accounts {
        writer.serialize(AccountRow::from(account))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the transaction log in CSV format
///
/// Writes the header followed by one row per transaction, in log order.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), AtmError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(output);

    writer.write_record(TRANSACTION_HEADERS)?;
    for tx in transactions {
        writer.serialize(tx)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{seed_accounts, TransactionType};
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    fn row(card: &str, pin: &str, balance: &str) -> AccountRow {
        AccountRow {
            id: 1,
            owner: "Liza".to_string(),
            card: card.to_string(),
            pin: pin.to_string(),
            balance: balance.to_string(),
            blocked: false,
        }
    }

    fn sample_log() -> Vec<Transaction> {
        let t0: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let t1: DateTime<Utc> = DateTime::from_timestamp(1_700_000_060, 0).unwrap();
        vec![
            Transaction::deposit(t0, 1, Decimal::new(25050, 2), Decimal::new(175050, 2)),
            Transaction::transfer(
                t1,
                1,
                2,
                "5555666677778888",
                Decimal::new(30000, 2),
                Decimal::new(145050, 2),
            ),
        ]
    }

    #[test]
    fn test_convert_account_row_valid() {
        let account = convert_account_row(row("1111222233334444", "0000", "1500")).unwrap();
        assert_eq!(account.card, "1111222233334444");
        assert_eq!(account.pin, "0000");
        assert_eq!(account.balance.to_string(), "1500.00");
    }

    #[rstest]
    #[case::short_card(row("111122223333", "1234", "10.00"), "malformed card")]
    #[case::bad_pin(row("1111222233334444", "12a4", "10.00"), "malformed PIN")]
    #[case::bad_balance(row("1111222233334444", "1234", "ten"), "invalid balance")]
    #[case::negative_balance(row("1111222233334444", "1234", "-0.01"), "negative balance")]
    fn test_convert_account_row_rejects(#[case] input: AccountRow, #[case] expected: &str) {
        let error = convert_account_row(input).unwrap_err();
        assert!(error.contains(expected), "unexpected error: {}", error);
    }

    #[test]
    fn test_convert_account_row_rejects_empty_owner() {
        let mut input = row("1111222233334444", "1234", "1.00");
        input.owner = "  ".to_string();
        assert!(convert_account_row(input).unwrap_err().contains("empty owner"));
    }

    #[test]
    fn test_write_accounts_csv_format() {
        let mut output = Vec::new();
        write_accounts_csv(&seed_accounts()[..1], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "id,owner,card,pin,balance,blocked\n1,Liza,1111222233334444,1234,1500.00,false\n"
        );
    }

    #[test]
    fn test_write_empty_collections_still_emit_header() {
        let mut accounts = Vec::new();
        write_accounts_csv(&[], &mut accounts).unwrap();
        assert_eq!(String::from_utf8(accounts).unwrap(), "id,owner,card,pin,balance,blocked\n");

        let mut transactions = Vec::new();
        write_transactions_csv(&[], &mut transactions).unwrap();
        assert_eq!(
            String::from_utf8(transactions).unwrap(),
            "time,fromId,toId,type,amount,balanceAfter,note\n"
        );
        assert!(read_transactions_csv(TRANSACTION_HEADERS.join(",").as_bytes())
            .records
            .is_empty());
    }

    #[test]
    fn test_accounts_reload_field_for_field() {
        let mut accounts = seed_accounts();
        accounts[2].blocked = true;

        let mut output = Vec::new();
        write_accounts_csv(&accounts, &mut output).unwrap();
        let loaded = read_accounts_csv(output.as_slice());

        assert!(loaded.is_clean());
        assert_eq!(loaded.records, accounts);
    }

    #[test]
    fn test_transactions_reload_field_for_field() {
        let log = sample_log();

        let mut output = Vec::new();
        write_transactions_csv(&log, &mut output).unwrap();
        let text = String::from_utf8(output.clone()).unwrap();
        assert!(text.contains(",1,,DEPOSIT,250.50,1750.50,Cash deposit"));
        assert!(text.contains(",1,2,TRANSFER,300.00,1450.50,to card 5555666677778888"));

        let loaded = read_transactions_csv(output.as_slice());
        assert!(loaded.is_clean());
        assert_eq!(loaded.records, log);
        assert_eq!(loaded.records[0].tx_type, TransactionType::Deposit);
        assert_eq!(loaded.records[0].to_id, None);
    }

    #[test]
    fn test_read_accounts_skips_malformed_and_duplicate_rows() {
        let input = "id,owner,card,pin,balance,blocked\n\
                     1,Liza,1111222233334444,1234,1500.00,false\n\
                     2,Anna,5555666677778888,56,500.00,false\n\
                     1,Copy,9999000011112222,0000,1.00,false\n\
                     4,Clone,1111222233334444,0000,1.00,false\n\
                     5,Bad,row\n\
                     3,Ola,9999000011112222,0000,200.00,true\n";

        let loaded = read_accounts_csv(input.as_bytes());

        let ids: Vec<_> = loaded.records.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(loaded.records[1].blocked);
        assert_eq!(loaded.rejected.len(), 4);
        assert!(loaded.rejected[0].starts_with("Line 3:"));
        assert!(loaded.rejected[1].contains("duplicate account id 1"));
        assert!(loaded.rejected[2].contains("already used"));
    }

    #[test]
    fn test_read_transactions_skips_malformed_rows() {
        let input = "time,fromId,toId,type,amount,balanceAfter,note\n\
                     2024-01-01T10:00:00Z,1,,DEPOSIT,10.00,1510.00,Cash deposit\n\
                     yesterday,1,,DEPOSIT,10.00,1520.00,Cash deposit\n\
                     2024-01-01T10:05:00Z,1,,REFUND,10.00,1520.00,?\n\
                     2024-01-01T10:10:00Z,1,,CHANGE_PIN,0,1510.00,PIN change\n";

        let loaded = read_transactions_csv(input.as_bytes());

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[1].tx_type, TransactionType::ChangePin);
        assert_eq!(loaded.rejected.len(), 2);
        assert!(loaded.rejected[0].starts_with("Line 3:"));
    }

    #[test]
    fn test_read_garbage_yields_empty_collection() {
        let loaded = read_accounts_csv("\u{0}\u{1}not a csv file at all".as_bytes());
        assert!(loaded.records.is_empty());
    }
}
