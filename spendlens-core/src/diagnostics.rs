//! Per-run troubleshooting record. Has no effect on transaction data.
//!
//! Entries are keyed by page index, so logs built for different pages (or
//! on different threads) can be merged in any order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{PageError, RejectReason};
use crate::page::{RawRow, RawTable};

const ROW_SAMPLE_LIMIT: usize = 3;
const TEXT_SAMPLE_CHARS: usize = 500;

/// How a page's candidates were recovered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Nothing was attempted (page failed or was empty)
    #[default]
    None,
    Table,
    TextFallback,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDiagnostics {
    pub page_index: usize,
    pub tables_found: usize,
    /// First rows of each table; only kept in verbose mode
    pub rows_sampled: Vec<RawRow>,
    /// Leading text of the page; only kept in verbose mode
    pub text_sample: String,
    pub candidate_count: usize,
    pub strategy: Strategy,
    pub errors: Vec<String>,
}

impl PageDiagnostics {
    fn merge(&mut self, other: PageDiagnostics) {
        self.tables_found += other.tables_found;
        self.rows_sampled.extend(other.rows_sampled);
        if self.text_sample.is_empty() {
            self.text_sample = other.text_sample;
        }
        self.candidate_count += other.candidate_count;
        if self.strategy == Strategy::None {
            self.strategy = other.strategy;
        }
        self.errors.extend(other.errors);
    }
}

/// Candidates dropped during validation, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub unparsable_date: usize,
    pub unparsable_amount: usize,
    pub zero_amount: usize,
    pub empty_description: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::UnparsableDate => self.unparsable_date += 1,
            RejectReason::UnparsableAmount => self.unparsable_amount += 1,
            RejectReason::ZeroAmount => self.zero_amount += 1,
            RejectReason::EmptyDescription => self.empty_description += 1,
        }
    }

    pub fn get(&self, reason: RejectReason) -> usize {
        match reason {
            RejectReason::UnparsableDate => self.unparsable_date,
            RejectReason::UnparsableAmount => self.unparsable_amount,
            RejectReason::ZeroAmount => self.zero_amount,
            RejectReason::EmptyDescription => self.empty_description,
        }
    }

    pub fn total(&self) -> usize {
        self.unparsable_date + self.unparsable_amount + self.zero_amount + self.empty_description
    }

    fn merge(&mut self, other: RejectionCounts) {
        self.unparsable_date += other.unparsable_date;
        self.unparsable_amount += other.unparsable_amount;
        self.zero_amount += other.zero_amount;
        self.empty_description += other.empty_description;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsLog {
    verbose: bool,
    pages: BTreeMap<usize, PageDiagnostics>,
    rejections: RejectionCounts,
    duplicates_removed: usize,
}

impl DiagnosticsLog {
    /// `verbose` keeps row and text samples; otherwise only counts are kept.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ..Self::default()
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    fn page_mut(&mut self, page_index: usize) -> &mut PageDiagnostics {
        self.pages.entry(page_index).or_insert_with(|| PageDiagnostics {
            page_index,
            ..PageDiagnostics::default()
        })
    }

    pub fn record_tables(&mut self, page_index: usize, tables: &[RawTable]) {
        let verbose = self.verbose;
        let entry = self.page_mut(page_index);
        entry.tables_found += tables.len();
        if verbose {
            for table in tables {
                entry
                    .rows_sampled
                    .extend(table.rows.iter().take(ROW_SAMPLE_LIMIT).cloned());
            }
        }
    }

    pub fn record_text(&mut self, page_index: usize, lines: &[String]) {
        let verbose = self.verbose;
        let entry = self.page_mut(page_index);
        if verbose && entry.text_sample.is_empty() {
            entry.text_sample = lines
                .join(" ")
                .chars()
                .take(TEXT_SAMPLE_CHARS)
                .collect::<String>()
                .trim()
                .to_string();
        }
    }

    pub fn record_candidates(&mut self, page_index: usize, strategy: Strategy, count: usize) {
        let entry = self.page_mut(page_index);
        entry.strategy = strategy;
        entry.candidate_count += count;
    }

    pub fn record_page_error(&mut self, error: &PageError) {
        let PageError::ExtractionFailed { page, .. } = error;
        let message = error.to_string();
        self.page_mut(*page).errors.push(message);
    }

    pub fn record_rejection(&mut self, reason: RejectReason) {
        self.rejections.record(reason);
    }

    pub fn record_duplicates(&mut self, count: usize) {
        self.duplicates_removed += count;
    }

    /// Fold another log into this one. Entries for the same page are combined.
    pub fn merge(&mut self, other: DiagnosticsLog) {
        self.verbose |= other.verbose;
        for (index, page) in other.pages {
            match self.pages.get_mut(&index) {
                Some(existing) => existing.merge(page),
                None => {
                    self.pages.insert(index, page);
                }
            }
        }
        self.rejections.merge(other.rejections);
        self.duplicates_removed += other.duplicates_removed;
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageDiagnostics> {
        self.pages.values()
    }

    pub fn page(&self, page_index: usize) -> Option<&PageDiagnostics> {
        self.pages.get(&page_index)
    }

    pub fn rejections(&self) -> &RejectionCounts {
        &self.rejections
    }

    pub fn duplicates_removed(&self) -> usize {
        self.duplicates_removed
    }

    pub fn candidate_total(&self) -> usize {
        self.pages.values().map(|p| p.candidate_count).sum()
    }

    pub fn error_count(&self) -> usize {
        self.pages.values().map(|p| p.errors.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            (0..5)
                .map(|i| vec![format!("r{i}"), "x".to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_summary_mode_drops_samples() {
        let mut log = DiagnosticsLog::new(false);
        log.record_tables(1, &[table()]);
        log.record_text(1, &["hello".to_string()]);
        let page = log.page(1).unwrap();
        assert_eq!(page.tables_found, 1);
        assert!(page.rows_sampled.is_empty());
        assert!(page.text_sample.is_empty());
    }

    #[test]
    fn test_verbose_mode_samples_rows_and_text() {
        let mut log = DiagnosticsLog::new(true);
        log.record_tables(1, &[table()]);
        log.record_text(1, &["a".repeat(400), "b".repeat(400)]);
        let page = log.page(1).unwrap();
        assert_eq!(page.rows_sampled.len(), ROW_SAMPLE_LIMIT);
        assert_eq!(page.text_sample.chars().count(), TEXT_SAMPLE_CHARS);
    }

    #[test]
    fn test_rejection_counts() {
        let mut log = DiagnosticsLog::new(false);
        log.record_rejection(RejectReason::ZeroAmount);
        log.record_rejection(RejectReason::ZeroAmount);
        log.record_rejection(RejectReason::UnparsableDate);
        assert_eq!(log.rejections().get(RejectReason::ZeroAmount), 2);
        assert_eq!(log.rejections().total(), 3);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut page_one = DiagnosticsLog::new(false);
        page_one.record_candidates(1, Strategy::Table, 4);
        let mut page_two = DiagnosticsLog::new(false);
        page_two.record_candidates(2, Strategy::TextFallback, 2);
        page_two.record_page_error(&PageError::ExtractionFailed {
            page: 3,
            reason: "bad stream".into(),
        });

        let mut a = DiagnosticsLog::new(false);
        a.merge(page_one.clone());
        a.merge(page_two.clone());
        let mut b = DiagnosticsLog::new(false);
        b.merge(page_two);
        b.merge(page_one);

        assert_eq!(a, b);
        assert_eq!(a.candidate_total(), 6);
        assert_eq!(a.error_count(), 1);
        assert_eq!(a.page(2).unwrap().strategy, Strategy::TextFallback);
    }
}
