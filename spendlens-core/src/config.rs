//! Pipeline configuration. Every field has a default so partial config
//! files only override what they name.

use serde::{Deserialize, Serialize};

use crate::categorizer::RuleTable;
use crate::error::ConfigError;
use crate::finance::Direction;

/// Accepted date formats, tried in order. Day-first formats come before US ones.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%d%b,%Y",
    "%d %b, %Y",
    "%d %b %Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%m-%y",
    "%d/%m/%y",
    "%d.%m.%y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%m/%d/%Y",
    "%m-%d-%Y",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub date_formats: Vec<String>,
    /// Inclusive range of years a parsed date may fall in
    pub year_window: (i32, i32),
    /// Direction given to candidates with no usable direction signal
    pub ambiguous_direction: Direction,
    /// Keep row/text samples in diagnostics, not just counts
    pub debug: bool,
    pub top_merchants_limit: usize,
    pub category_rules: RuleTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            year_window: (2000, 2099),
            ambiguous_direction: Direction::Debit,
            debug: false,
            top_merchants_limit: 10,
            category_rules: RuleTable::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.date_formats.iter().all(|f| f.trim().is_empty()) {
            return Err(ConfigError::NoDateFormats);
        }
        let (lo, hi) = self.year_window;
        if lo > hi {
            return Err(ConfigError::EmptyYearWindow(lo, hi));
        }
        if self.top_merchants_limit == 0 {
            return Err(ConfigError::ZeroMerchantLimit);
        }
        self.category_rules.validate()
    }

    pub fn year_in_window(&self, year: i32) -> bool {
        let (lo, hi) = self.year_window;
        (lo..=hi).contains(&year)
    }
}
