//! spendlens-finance: categorization, aggregates, trends and the end-to-end
//! statement pipeline

pub mod analytics;
pub mod categorize;
pub mod pipeline;
pub mod query;
pub mod trends;

pub use analytics::{AnalysisResult, DateRange, MerchantSummary, YearMonth, aggregate};
pub use categorize::categorize_all;
pub use pipeline::{RunStatus, StatementReport, analyze_pages, analyze_pdf};
pub use query::{SortKey, TransactionQuery};
pub use trends::{Period, TrendPoint, spending_trends};
