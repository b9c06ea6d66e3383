//! Transaction record types: candidates straight out of a page, and the
//! canonical validated form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Keywords that mark money leaving the account. Checked before credit keywords.
pub const DEBIT_KEYWORDS: &[&str] = &[
    "paid to",
    "paidto",
    "self transfer",
    "selftransferto",
    "sent",
    "debited",
    "debit",
    "withdrawal",
    "deducted",
    "spent",
    "paid",
];

/// Keywords that mark money entering the account.
pub const CREDIT_KEYWORDS: &[&str] = &[
    "receivedfrom",
    "received",
    "credited",
    "credit",
    "deposit",
    "refund",
    "cashback",
    "added",
];

/// Money leaving (debit) or entering (credit) the account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Resolve a raw direction marker (a type column cell, a sign, or a
    /// keyword found in the description). Unknown markers are ambiguous.
    pub fn from_marker(marker: &str) -> Option<Direction> {
        let m = marker.trim().trim_end_matches('.').to_lowercase();
        match m.as_str() {
            "" => None,
            "-" | "(" | "dr" => Some(Direction::Debit),
            "+" | "cr" => Some(Direction::Credit),
            other if DEBIT_KEYWORDS.contains(&other) => Some(Direction::Debit),
            other if CREDIT_KEYWORDS.contains(&other) => Some(Direction::Credit),
            _ => None,
        }
    }

    /// First direction keyword found inside free text, debit keywords first.
    pub fn keyword_in(text: &str) -> Option<&'static str> {
        let lower = text.to_lowercase();
        DEBIT_KEYWORDS
            .iter()
            .chain(CREDIT_KEYWORDS.iter())
            .find(|k| lower.contains(*k))
            .copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// The fixed, closed set of spending categories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodDining,
    #[serde(rename = "Transport")]
    Transport,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Bills & Utilities")]
    BillsUtilities,
    #[serde(rename = "Healthcare")]
    Healthcare,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Banking & Finance")]
    BankingFinance,
    #[serde(rename = "Travel")]
    Travel,
    #[serde(rename = "Recharge & DTH")]
    RechargeDth,
    #[serde(rename = "Investments")]
    Investments,
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::FoodDining,
        Category::Transport,
        Category::Shopping,
        Category::Entertainment,
        Category::BillsUtilities,
        Category::Healthcare,
        Category::Education,
        Category::BankingFinance,
        Category::Travel,
        Category::RechargeDth,
        Category::Investments,
        Category::Other,
    ];

    /// Human-readable label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Category::FoodDining => "Food & Dining",
            Category::Transport => "Transport",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsUtilities => "Bills & Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::BankingFinance => "Banking & Finance",
            Category::Travel => "Travel",
            Category::RechargeDth => "Recharge & DTH",
            Category::Investments => "Investments",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| format!("unknown category: {wanted}"))
    }
}

/// Which interpreter produced a candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Table,
    Text,
}

/// Best guess at a transaction before validation. Any field may be malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTransaction {
    pub raw_date: String,
    pub raw_description: String,
    pub raw_amount: String,
    pub raw_direction: Option<String>,
    /// 1-based page index
    pub source_page: usize,
    pub source_kind: SourceKind,
}

/// A validated transaction.
///
/// `amount` is never negative: the sign lives in `direction`. `category`
/// is attached once by the categorizer and left alone afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
    pub category: Option<Category>,
    pub source_page: usize,
}

/// Identity used for de-duplication
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub direction: Direction,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        direction: Direction,
        source_page: usize,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            direction,
            category: None,
            source_page,
        }
    }

    /// Attach a category. A category that is already set is kept.
    pub fn with_category(mut self, category: Category) -> Self {
        if self.category.is_none() {
            self.category = Some(category);
        }
        self
    }

    /// Category, treating an uncategorized record as `Other`
    pub fn category_or_other(&self) -> Category {
        self.category.unwrap_or(Category::Other)
    }

    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            date: self.date,
            description: self.description.clone(),
            amount: self.amount.normalize(),
            direction: self.direction,
        }
    }
}
