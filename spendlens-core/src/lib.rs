//! spendlens-core: data model, error taxonomy, diagnostics and configuration
//! for the statement analysis pipeline

pub mod categorizer;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod finance;
pub mod page;

pub use categorizer::{CategoryRule, RuleTable};
pub use config::{DEFAULT_DATE_FORMATS, PipelineConfig};
pub use diagnostics::{DiagnosticsLog, PageDiagnostics, RejectionCounts, Strategy};
pub use error::{AnalysisError, ConfigError, PageError, RejectReason};
pub use finance::{CandidateTransaction, Category, DedupKey, Direction, SourceKind, Transaction};
pub use page::{RawPage, RawRow, RawTable};
