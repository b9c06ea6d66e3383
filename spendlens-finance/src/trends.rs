//! Debit spending bucketed by day, week or month.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use spendlens_core::Transaction;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
}

impl Period {
    /// First day of the period containing `date`. Weeks start on Monday.
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => date,
            Period::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Period::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    fn label(&self, start: NaiveDate) -> String {
        match self {
            Period::Monthly => start.format("%Y-%m").to_string(),
            _ => start.format("%Y-%m-%d").to_string(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        })
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            other => Err(format!("unknown period: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub start: NaiveDate,
    pub amount: Decimal,
}

/// Sum debit amounts per period, oldest first. Periods without spending
/// are omitted.
pub fn spending_trends(txns: &[Transaction], period: Period) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in txns.iter().filter(|t| t.is_debit()) {
        *buckets.entry(period.start_of(t.date)).or_default() += t.amount;
    }
    buckets
        .into_iter()
        .map(|(start, amount)| TrendPoint {
            period: period.label(start),
            start,
            amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendlens_core::Direction;

    fn debit(y: i32, m: u32, d: u32, cents: i64) -> Transaction {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Transaction::new(date, "x", Decimal::new(cents, 2), Direction::Debit, 1)
    }

    #[test]
    fn test_weeks_start_on_monday() {
        // 2024-05-12 is a Sunday
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        assert_eq!(
            Period::Weekly.start_of(sunday),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
        );
    }

    #[test]
    fn test_weekly_buckets() {
        let txns = vec![
            debit(2024, 5, 6, 100),
            debit(2024, 5, 12, 200),
            debit(2024, 5, 13, 400),
        ];
        let points = spending_trends(&txns, Period::Weekly);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].period, "2024-05-06");
        assert_eq!(points[0].amount, Decimal::new(300, 2));
        assert_eq!(points[1].period, "2024-05-13");
    }

    #[test]
    fn test_monthly_ignores_credits() {
        let mut refund = debit(2024, 6, 2, 9900);
        refund.direction = Direction::Credit;
        let txns = vec![debit(2024, 6, 1, 100), refund, debit(2024, 5, 30, 50)];
        let points = spending_trends(&txns, Period::Monthly);
        let labels: Vec<&str> = points.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(labels, vec!["2024-05", "2024-06"]);
        assert_eq!(points[1].amount, Decimal::new(100, 2));
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("Weekly".parse::<Period>(), Ok(Period::Weekly));
        assert_eq!("day".parse::<Period>(), Ok(Period::Daily));
        assert!("yearly".parse::<Period>().is_err());
    }
}
