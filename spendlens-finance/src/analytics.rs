//! Aggregator: summary statistics over a categorized transaction set.
//!
//! Spending figures (category and monthly totals, merchants, averages) are
//! computed over debits only. Every call recomputes from scratch.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use spendlens_core::{Category, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Calendar month key, serialized as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantSummary {
    pub merchant: String,
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive day count
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub total_spent: Decimal,
    pub total_income: Decimal,
    pub net_balance: Decimal,
    pub transaction_count: usize,
    pub category_totals: BTreeMap<Category, Decimal>,
    pub monthly_totals: BTreeMap<YearMonth, Decimal>,
    pub top_merchants: Vec<MerchantSummary>,
    pub average_transaction_size: Decimal,
    pub largest_transaction: Option<Transaction>,
    pub daily_average: Decimal,
    pub date_range: Option<DateRange>,
}

impl AnalysisResult {
    /// Result for an empty transaction set: all totals zero, nothing ranked.
    pub fn empty() -> Self {
        Self {
            total_spent: Decimal::ZERO,
            total_income: Decimal::ZERO,
            net_balance: Decimal::ZERO,
            transaction_count: 0,
            category_totals: BTreeMap::new(),
            monthly_totals: BTreeMap::new(),
            top_merchants: Vec::new(),
            average_transaction_size: Decimal::ZERO,
            largest_transaction: None,
            daily_average: Decimal::ZERO,
            date_range: None,
        }
    }
}

/// Mean rounded to cents; zero when `count` is zero.
pub(crate) fn average(total: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn date_range(txns: &[Transaction]) -> Option<DateRange> {
    let start = txns.iter().map(|t| t.date).min()?;
    let end = txns.iter().map(|t| t.date).max()?;
    Some(DateRange {
        start,
        end,
        days: (end - start).num_days() + 1,
    })
}

/// Merchants ranked by debit total desc, then count desc, then name asc.
pub fn top_merchants(txns: &[Transaction], limit: usize) -> Vec<MerchantSummary> {
    let mut groups: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for t in txns.iter().filter(|t| t.is_debit()) {
        let entry = groups.entry(t.description.as_str()).or_default();
        entry.0 += t.amount;
        entry.1 += 1;
    }

    let mut rows: Vec<MerchantSummary> = groups
        .into_iter()
        .map(|(merchant, (total, count))| MerchantSummary {
            merchant: merchant.to_string(),
            total,
            count,
            average: average(total, count),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| b.count.cmp(&a.count))
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    rows.truncate(limit);
    rows
}

/// Compute every aggregate over `txns`.
pub fn aggregate(txns: &[Transaction], top_merchants_limit: usize) -> AnalysisResult {
    if txns.is_empty() {
        return AnalysisResult::empty();
    }

    let mut total_spent = Decimal::ZERO;
    let mut total_income = Decimal::ZERO;
    let mut debit_count = 0usize;
    let mut category_totals: BTreeMap<Category, Decimal> = BTreeMap::new();
    let mut monthly_totals: BTreeMap<YearMonth, Decimal> = BTreeMap::new();
    let mut largest: Option<&Transaction> = None;

    for t in txns {
        if t.is_credit() {
            total_income += t.amount;
            continue;
        }
        total_spent += t.amount;
        debit_count += 1;
        *category_totals.entry(t.category_or_other()).or_default() += t.amount;
        *monthly_totals.entry(YearMonth::of(t.date)).or_default() += t.amount;
        if largest.is_none_or(|l| t.amount > l.amount) {
            largest = Some(t);
        }
    }

    let range = date_range(txns);
    let days = range.map(|r| r.days.max(1) as usize).unwrap_or(1);

    AnalysisResult {
        total_spent,
        total_income,
        net_balance: total_income - total_spent,
        transaction_count: txns.len(),
        category_totals,
        monthly_totals,
        top_merchants: top_merchants(txns, top_merchants_limit),
        average_transaction_size: average(total_spent, debit_count),
        largest_transaction: largest.cloned(),
        daily_average: average(total_spent, days),
        date_range: range,
    }
}
