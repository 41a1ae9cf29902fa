//! The monthly aggregator.
//!
//! [summarize] is a pure function over an in-memory transaction list. It is
//! deliberately independent of where the transactions came from, so the
//! page and the CSV export show identical numbers whichever store served
//! the request.

use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};

use crate::transaction::{Transaction, TransactionKind};

/// The month a summary covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The calendar month.
    pub month: Month,
    /// The calendar year.
    pub year: i32,
}

impl Period {
    /// The period containing today's date (UTC).
    pub fn current() -> Self {
        let today = OffsetDateTime::now_utc().date();

        Self {
            month: today.month(),
            year: today.year(),
        }
    }

    /// Whether `date` falls within this period.
    pub fn contains(self, date: Date) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// The month as a number in [1, 12].
    pub fn month_number(self) -> u8 {
        self.month as u8
    }
}

/// The month selector's query string, e.g. `?month=3&year=2024`.
///
/// Both fields default to the current date so that `/transactions` with no
/// query shows the current month.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PeriodQuery {
    /// The calendar month in [1, 12].
    pub month: Option<u8>,
    /// The calendar year.
    pub year: Option<i32>,
}

impl PeriodQuery {
    /// Resolve the query into a [Period], falling back to the current month
    /// for missing or out-of-range values.
    pub fn resolve(self) -> Period {
        let current = Period::current();

        let month = self
            .month
            .and_then(|number| Month::try_from(number).ok())
            .unwrap_or(current.month);
        let year = self.year.unwrap_or(current.year);

        Period { month, year }
    }
}

/// The aggregate view of one month of transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialSummary {
    /// The sum of income amounts in the period.
    pub total_income: f64,
    /// The sum of expense amounts in the period.
    pub total_expense: f64,
    /// `total_income - total_expense`. May be negative.
    pub balance: f64,
    /// The period's transactions, most recent date first. Transactions
    /// sharing a date keep their input order.
    pub transactions: Vec<Transaction>,
}

/// Summarize the transactions that fall within the calendar month given by
/// `month` and `year`.
///
/// Transactions outside the period contribute nothing. The returned list is
/// sorted by date descending with a stable tie-break, so two entries dated
/// the same day appear in the order they were given.
pub fn summarize(transactions: &[Transaction], month: Month, year: i32) -> FinancialSummary {
    let period = Period { month, year };

    let mut in_period: Vec<Transaction> = transactions
        .iter()
        .filter(|transaction| period.contains(transaction.date))
        .cloned()
        .collect();

    in_period.sort_by(|a, b| b.date.cmp(&a.date));

    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in &in_period {
        match transaction.kind {
            TransactionKind::Income => total_income += transaction.amount,
            TransactionKind::Expense => total_expense += transaction.amount,
        }
    }

    FinancialSummary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transactions: in_period,
    }
}

#[cfg(test)]
mod summary_tests {
    use time::{Date, Month, macros::date};

    use crate::{
        transaction::{Transaction, TransactionKind},
        user::UserId,
    };

    use super::{PeriodQuery, summarize};

    fn transaction(id: &str, amount: f64, date: Date, kind: TransactionKind) -> Transaction {
        let category = match kind {
            TransactionKind::Income => "Salário",
            TransactionKind::Expense => "Alimentação",
        };

        Transaction {
            id: id.to_owned(),
            owner: UserId::new("user-1"),
            description: format!("transaction {id}"),
            amount,
            category: category.to_owned(),
            date,
            kind,
            created_at: None,
        }
    }

    #[test]
    fn empty_input_gives_zero_summary() {
        let summary = summarize(&[], Month::March, 2024);

        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.total_expense, 0.0);
        assert_eq!(summary.balance, 0.0);
        assert!(summary.transactions.is_empty());
    }

    #[test]
    fn filters_to_the_calendar_month() {
        let transactions = [
            transaction("1", 100.0, date!(2024 - 03 - 10), TransactionKind::Income),
            // Same month, different year.
            transaction("2", 200.0, date!(2023 - 03 - 10), TransactionKind::Income),
            // Adjacent month, same year.
            transaction("3", 300.0, date!(2024 - 02 - 29), TransactionKind::Income),
            transaction("4", 400.0, date!(2024 - 04 - 01), TransactionKind::Income),
        ];

        let summary = summarize(&transactions, Month::March, 2024);

        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.transactions[0].id, "1");
        assert_eq!(summary.total_income, 100.0);
    }

    #[test]
    fn totals_split_by_kind_and_balance_subtracts() {
        let transactions = [
            transaction("1", 1000.0, date!(2024 - 03 - 01), TransactionKind::Income),
            transaction("2", 150.0, date!(2024 - 03 - 10), TransactionKind::Expense),
            transaction("3", 50.0, date!(2024 - 03 - 12), TransactionKind::Expense),
            transaction("4", 500.0, date!(2024 - 03 - 20), TransactionKind::Income),
        ];

        let summary = summarize(&transactions, Month::March, 2024);

        assert_eq!(summary.total_income, 1500.0);
        assert_eq!(summary.total_expense, 200.0);
        assert_eq!(summary.balance, 1300.0);
    }

    #[test]
    fn balance_may_be_negative() {
        let transactions = [
            transaction("1", 100.0, date!(2024 - 03 - 01), TransactionKind::Income),
            transaction("2", 250.0, date!(2024 - 03 - 02), TransactionKind::Expense),
        ];

        let summary = summarize(&transactions, Month::March, 2024);

        assert_eq!(summary.balance, -150.0);
    }

    #[test]
    fn sorts_by_date_descending() {
        let transactions = [
            transaction("1", 10.0, date!(2024 - 03 - 05), TransactionKind::Expense),
            transaction("2", 10.0, date!(2024 - 03 - 20), TransactionKind::Expense),
            transaction("3", 10.0, date!(2024 - 03 - 12), TransactionKind::Expense),
        ];

        let summary = summarize(&transactions, Month::March, 2024);

        let ids: Vec<&str> = summary
            .transactions
            .iter()
            .map(|transaction| transaction.id.as_str())
            .collect();
        assert_eq!(ids, ["2", "3", "1"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let transactions = [
            transaction("first", 10.0, date!(2024 - 03 - 10), TransactionKind::Expense),
            transaction("second", 10.0, date!(2024 - 03 - 10), TransactionKind::Expense),
            transaction("third", 10.0, date!(2024 - 03 - 10), TransactionKind::Expense),
        ];

        let summary = summarize(&transactions, Month::March, 2024);

        let ids: Vec<&str> = summary
            .transactions
            .iter()
            .map(|transaction| transaction.id.as_str())
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn query_resolves_explicit_month_and_year() {
        let period = PeriodQuery {
            month: Some(3),
            year: Some(2024),
        }
        .resolve();

        assert_eq!(period.month, Month::March);
        assert_eq!(period.year, 2024);
        assert_eq!(period.month_number(), 3);
    }

    #[test]
    fn query_out_of_range_month_falls_back_to_current() {
        let current = super::Period::current();

        let period = PeriodQuery {
            month: Some(13),
            year: Some(2024),
        }
        .resolve();

        assert_eq!(period.month, current.month);
        assert_eq!(period.year, 2024);
    }
}
