//! End-to-end run: PDF bytes to categorized transactions, aggregates and
//! diagnostics.

use serde::Serialize;
use spendlens_core::{AnalysisError, DiagnosticsLog, PipelineConfig, RawPage, Transaction};
use spendlens_ingest::{extract_pages, interpret_page, normalize};
use tracing::info;

use crate::analytics::{AnalysisResult, aggregate};
use crate::categorize::categorize_all;

/// Outcome of a run that could read the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Ok,
    /// Nothing survived validation; see the diagnostics for why
    NoTransactionsFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementReport {
    pub transactions: Vec<Transaction>,
    pub analysis: AnalysisResult,
    pub diagnostics: DiagnosticsLog,
    pub status: RunStatus,
}

impl StatementReport {
    pub fn is_empty(&self) -> bool {
        self.status == RunStatus::NoTransactionsFound
    }
}

/// Analyze a statement held in memory. Only an unreadable document fails.
pub fn analyze_pdf(
    bytes: &[u8],
    password: Option<&str>,
    config: &PipelineConfig,
) -> Result<StatementReport, AnalysisError> {
    let mut log = DiagnosticsLog::new(config.debug);
    let pages = extract_pages(bytes, password, &mut log)?;
    Ok(analyze_pages(pages, config, log))
}

/// Run everything after extraction. Each page is interpreted against its
/// own log, folded into `log` afterwards.
pub fn analyze_pages(
    pages: Vec<RawPage>,
    config: &PipelineConfig,
    mut log: DiagnosticsLog,
) -> StatementReport {
    let page_count = pages.len();
    let mut candidates = Vec::new();
    for page in &pages {
        let mut page_log = DiagnosticsLog::new(log.is_verbose());
        candidates.extend(interpret_page(page, &mut page_log));
        log.merge(page_log);
    }

    let normalized = normalize(candidates, config, &mut log);
    let transactions = categorize_all(normalized.transactions, &config.category_rules);
    let analysis = aggregate(&transactions, config.top_merchants_limit);

    let status = if transactions.is_empty() {
        RunStatus::NoTransactionsFound
    } else {
        RunStatus::Ok
    };
    info!(
        pages = page_count,
        candidates = log.candidate_total(),
        transactions = transactions.len(),
        rejected = normalized.rejected,
        duplicates = normalized.duplicates,
        ?status,
        "statement analyzed"
    );

    StatementReport {
        transactions,
        analysis,
        diagnostics: log,
        status,
    }
}
