//! Lazy transaction history scan

use crate::types::{AccountId, Transaction};
use std::iter::Rev;
use std::slice::Iter;

/// Iterator over the transactions related to one account, newest first
///
/// Scans the log backwards and stops after `limit` matches, so only as much
/// of the log is visited as needed. The iterator borrows the log; asking the
/// store for a new one rescans the current state.
#[derive(Debug, Clone)]
pub struct RecentTransactions<'a> {
    log: Rev<Iter<'a, Transaction>>,
    account: AccountId,
    remaining: usize,
}

impl<'a> RecentTransactions<'a> {
    pub fn new(log: &'a [Transaction], account: AccountId, limit: usize) -> Self {
        RecentTransactions {
            log: log.iter().rev(),
            account,
            remaining: limit,
        }
    }
}

impl<'a> Iterator for RecentTransactions<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let account = self.account;
        let tx = self.log.find(|tx| tx.is_related_to(account))?;
        self.remaining -= 1;
        Some(tx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining.min(self.log.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn at(offset: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + offset, 0).unwrap()
    }

    /// Log of six entries: account 1 is related to entries 0, 2, 3 and 5
    fn log() -> Vec<Transaction> {
        vec![
            Transaction::deposit(at(0), 1, Decimal::ONE, Decimal::ONE),
            Transaction::deposit(at(1), 2, Decimal::ONE, Decimal::ONE),
            Transaction::transfer(at(2), 2, 1, "1111222233334444", Decimal::ONE, Decimal::ZERO),
            Transaction::withdraw(at(3), 1, Decimal::ONE, Decimal::ONE),
            Transaction::change_pin(at(4), 3, Decimal::ZERO),
            Transaction::change_pin(at(5), 1, Decimal::ONE),
        ]
    }

    #[rstest]
    #[case::all(10, vec![5, 3, 2, 0])]
    #[case::limited(2, vec![5, 3])]
    #[case::zero(0, vec![])]
    fn test_recent_transactions_order_and_limit(#[case] limit: usize, #[case] expected: Vec<i64>) {
        let log = log();
        let times: Vec<_> = RecentTransactions::new(&log, 1, limit)
            .map(|tx| tx.time)
            .collect();
        let expected: Vec<_> = expected.into_iter().map(at).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn test_recent_transactions_only_related() {
        let log = log();
        for tx in RecentTransactions::new(&log, 2, 10) {
            assert!(tx.from_id == Some(2) || tx.to_id == Some(2));
        }
        assert_eq!(RecentTransactions::new(&log, 2, 10).count(), 2);
        assert_eq!(RecentTransactions::new(&log, 42, 10).count(), 0);
    }

    #[test]
    fn test_recent_transactions_is_lazy() {
        let log = log();
        let mut scan = RecentTransactions::new(&log, 1, 10);

        scan.next();
        // Only the newest entry was visited
        assert_eq!(scan.log.len(), 5);
    }

    #[test]
    fn test_recent_transactions_can_be_restarted() {
        let log = log();
        let scan = RecentTransactions::new(&log, 1, 3);
        let first: Vec<_> = scan.clone().collect();
        let second: Vec<_> = scan.collect();
        assert_eq!(first, second);
    }
}
