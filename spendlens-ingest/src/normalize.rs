//! Transaction Normalizer & Deduplicator.
//!
//! Candidates from every page and both interpreters go through the same
//! checks: date, amount, description, direction. The first failing check
//! drops the candidate and is counted in diagnostics. Survivors are
//! de-duplicated on (date, description, amount, direction), keeping the
//! first occurrence, then stably sorted by date.

use spendlens_core::{
    CandidateTransaction, DiagnosticsLog, Direction, PipelineConfig, RejectReason, Transaction,
};
use std::collections::HashSet;
use tracing::debug;

use crate::patterns::{parse_amount, parse_date};

/// Normalizer output: clean transactions plus what was thrown away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    pub rejected: usize,
    pub duplicates: usize,
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate one candidate into an uncategorized transaction.
pub fn validate_candidate(
    candidate: &CandidateTransaction,
    config: &PipelineConfig,
) -> Result<Transaction, RejectReason> {
    let date = parse_date(&candidate.raw_date, config).ok_or(RejectReason::UnparsableDate)?;
    let amount = parse_amount(&candidate.raw_amount)?;

    let description = normalize_whitespace(&candidate.raw_description);
    if description.is_empty() {
        return Err(RejectReason::EmptyDescription);
    }

    let direction = candidate
        .raw_direction
        .as_deref()
        .and_then(Direction::from_marker)
        .unwrap_or(config.ambiguous_direction);

    Ok(Transaction::new(
        date,
        description,
        amount,
        direction,
        candidate.source_page,
    ))
}

/// Validate, de-duplicate and order candidates.
pub fn normalize(
    candidates: Vec<CandidateTransaction>,
    config: &PipelineConfig,
    log: &mut DiagnosticsLog,
) -> Normalized {
    let mut out = Normalized::default();
    let mut seen = HashSet::new();

    for candidate in &candidates {
        match validate_candidate(candidate, config) {
            Ok(txn) => {
                if seen.insert(txn.dedup_key()) {
                    out.transactions.push(txn);
                } else {
                    out.duplicates += 1;
                }
            }
            Err(reason) => {
                debug!(
                    page = candidate.source_page,
                    %reason,
                    raw = ?candidate,
                    "candidate rejected"
                );
                log.record_rejection(reason);
                out.rejected += 1;
            }
        }
    }

    log.record_duplicates(out.duplicates);
    out.transactions.sort_by_key(|t| t.date);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use spendlens_core::SourceKind;

    fn candidate(date: &str, desc: &str, amount: &str, dir: Option<&str>) -> CandidateTransaction {
        CandidateTransaction {
            raw_date: date.to_string(),
            raw_description: desc.to_string(),
            raw_amount: amount.to_string(),
            raw_direction: dir.map(str::to_string),
            source_page: 1,
            source_kind: SourceKind::Table,
        }
    }

    #[test]
    fn test_swiggy_row_normalizes() {
        let cfg = PipelineConfig::default();
        let txn = validate_candidate(
            &candidate("12/05/2024", "  SWIGGY   ORDER ", "₹345.00", Some("Debit")),
            &cfg,
        )
        .unwrap();
        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        assert_eq!(txn.description, "SWIGGY ORDER");
        assert_eq!(txn.amount, Decimal::new(34500, 2));
        assert_eq!(txn.direction, Direction::Debit);
        assert_eq!(txn.category, None);
    }

    #[test]
    fn test_first_failure_wins() {
        let cfg = PipelineConfig::default();
        let check = |c: CandidateTransaction| validate_candidate(&c, &cfg).unwrap_err();
        assert_eq!(
            check(candidate("Total", "", "0.00", None)),
            RejectReason::UnparsableDate
        );
        assert_eq!(
            check(candidate("12/05/2024", "", "abc", None)),
            RejectReason::UnparsableAmount
        );
        assert_eq!(
            check(candidate("12/05/2024", "", "0.00", None)),
            RejectReason::ZeroAmount
        );
        assert_eq!(
            check(candidate("12/05/2024", "   ", "₹5", None)),
            RejectReason::EmptyDescription
        );
    }

    #[test]
    fn test_ambiguous_direction_uses_config() {
        let mut cfg = PipelineConfig::default();
        let c = candidate("12/05/2024", "Transfer", "₹5", Some("maybe"));
        assert_eq!(validate_candidate(&c, &cfg).unwrap().direction, Direction::Debit);
        cfg.ambiguous_direction = Direction::Credit;
        assert_eq!(validate_candidate(&c, &cfg).unwrap().direction, Direction::Credit);
    }

    #[test]
    fn test_duplicates_collapse_to_first() {
        let cfg = PipelineConfig::default();
        let mut log = DiagnosticsLog::new(false);
        let mut second = candidate("12/05/2024", "SWIGGY ORDER", "345", Some("Debit"));
        second.source_page = 2;
        let out = normalize(
            vec![
                candidate("12/05/2024", "SWIGGY ORDER", "₹345.00", Some("Debit")),
                second,
            ],
            &cfg,
            &mut log,
        );
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].source_page, 1);
        assert_eq!(out.duplicates, 1);
        assert_eq!(log.duplicates_removed(), 1);
    }

    #[test]
    fn test_same_key_different_direction_is_kept() {
        let cfg = PipelineConfig::default();
        let mut log = DiagnosticsLog::new(false);
        let out = normalize(
            vec![
                candidate("12/05/2024", "Ravi", "₹100", Some("Debit")),
                candidate("12/05/2024", "Ravi", "₹100", Some("Credit")),
            ],
            &cfg,
            &mut log,
        );
        assert_eq!(out.transactions.len(), 2);
    }

    #[test]
    fn test_sorted_by_date_then_extraction_order() {
        let cfg = PipelineConfig::default();
        let mut log = DiagnosticsLog::new(false);
        let out = normalize(
            vec![
                candidate("13/05/2024", "B", "₹2", None),
                candidate("12/05/2024", "A", "₹1", None),
                candidate("13/05/2024", "C", "₹3", None),
            ],
            &cfg,
            &mut log,
        );
        let order: Vec<&str> = out.transactions.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rejections_are_counted() {
        let cfg = PipelineConfig::default();
        let mut log = DiagnosticsLog::new(false);
        let out = normalize(
            vec![
                candidate("12/05/2024", "Refund", "0.00", Some("Credit")),
                candidate("not a date", "x", "₹1", None),
            ],
            &cfg,
            &mut log,
        );
        assert!(out.transactions.is_empty());
        assert_eq!(out.rejected, 2);
        assert_eq!(log.rejections().get(RejectReason::ZeroAmount), 1);
        assert_eq!(log.rejections().get(RejectReason::UnparsableDate), 1);
    }
}
