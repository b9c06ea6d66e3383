//! Per-page strategy selector: tables first, text fallback when the tables
//! yield nothing.

use spendlens_core::{CandidateTransaction, DiagnosticsLog, RawPage, Strategy};
use tracing::debug;

use crate::parsers::{interpret_lines, interpret_table};

/// Recover candidates from one page, recording what was tried.
pub fn interpret_page(page: &RawPage, log: &mut DiagnosticsLog) -> Vec<CandidateTransaction> {
    log.record_tables(page.index, &page.tables);
    log.record_text(page.index, &page.lines);

    let from_tables: Vec<CandidateTransaction> = page
        .tables
        .iter()
        .flat_map(|t| interpret_table(t, page.index))
        .collect();

    let (strategy, candidates) = if !from_tables.is_empty() {
        (Strategy::Table, from_tables)
    } else if !page.lines.is_empty() {
        (Strategy::TextFallback, interpret_lines(&page.lines, page.index))
    } else {
        (Strategy::None, Vec::new())
    };

    debug!(page = page.index, ?strategy, candidates = candidates.len(), "interpreted page");
    log.record_candidates(page.index, strategy, candidates.len());
    candidates
}
