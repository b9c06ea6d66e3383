//! Filtering and ordering of the transaction table for display and export.

use serde::{Deserialize, Serialize};
use spendlens_core::{Category, Direction, Transaction};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first
    #[default]
    Date,
    /// Largest first
    Amount,
    /// Alphabetical
    Description,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "amount" => Ok(SortKey::Amount),
            "description" | "desc" => Ok(SortKey::Description),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub direction: Option<Direction>,
    pub categories: Vec<Category>,
    pub sort: SortKey,
}

impl TransactionQuery {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if self.direction.is_some_and(|d| d != txn.direction) {
            return false;
        }
        self.categories.is_empty() || self.categories.contains(&txn.category_or_other())
    }

    /// Matching transactions in the requested order. Ties keep input order.
    pub fn apply<'a>(&self, txns: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut rows: Vec<&Transaction> = txns.iter().filter(|t| self.matches(t)).collect();
        match self.sort {
            SortKey::Date => rows.sort_by(|a, b| b.date.cmp(&a.date)),
            SortKey::Amount => rows.sort_by(|a, b| b.amount.cmp(&a.amount)),
            SortKey::Description => rows.sort_by(|a, b| {
                a.description
                    .to_lowercase()
                    .cmp(&b.description.to_lowercase())
            }),
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn txns() -> Vec<Transaction> {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        vec![
            Transaction::new(d(1), "zomato", Decimal::new(200, 0), Direction::Debit, 1)
                .with_category(Category::FoodDining),
            Transaction::new(d(3), "Salary", Decimal::new(5000, 0), Direction::Credit, 1)
                .with_category(Category::Other),
            Transaction::new(d(2), "Uber", Decimal::new(350, 0), Direction::Debit, 1)
                .with_category(Category::Transport),
        ]
    }

    #[test]
    fn test_default_is_newest_first() {
        let all = txns();
        let rows = TransactionQuery::default().apply(&all);
        let names: Vec<&str> = rows.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["Salary", "Uber", "zomato"]);
    }

    #[test]
    fn test_filter_debits_by_amount() {
        let all = txns();
        let q = TransactionQuery {
            direction: Some(Direction::Debit),
            sort: SortKey::Amount,
            ..Default::default()
        };
        let names: Vec<&str> = q.apply(&all).iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["Uber", "zomato"]);
    }

    #[test]
    fn test_filter_by_category_and_sort_by_description() {
        let all = txns();
        let q = TransactionQuery {
            categories: vec![Category::FoodDining, Category::Transport],
            sort: SortKey::Description,
            ..Default::default()
        };
        let names: Vec<&str> = q.apply(&all).iter().map(|t| t.description.as_str()).collect();
        assert_eq!(names, vec!["Uber", "zomato"]);
    }
}
