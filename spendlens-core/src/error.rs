use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal for a whole run: no partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("document unreadable: {reason}")]
    DocumentUnreadable { reason: String },
}

/// Per-page failure. Recorded in diagnostics; the page contributes nothing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("page {page}: extraction failed: {reason}")]
    ExtractionFailed { page: usize, reason: String },
}

/// Why the normalizer dropped a candidate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("date does not match any accepted format")]
    UnparsableDate,
    #[error("amount is not a valid non-negative number")]
    UnparsableAmount,
    #[error("amount is zero")]
    ZeroAmount,
    #[error("description is empty")]
    EmptyDescription,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("at least one date format is required")]
    NoDateFormats,
    #[error("year window {0}..={1} is empty")]
    EmptyYearWindow(i32, i32),
    #[error("category rule for {0} has no keywords")]
    EmptyRule(String),
    #[error("top merchant limit must be positive")]
    ZeroMerchantLimit,
}
