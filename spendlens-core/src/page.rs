//! Raw per-page content as it comes out of the PDF, before any typing.

use serde::{Deserialize, Serialize};

/// One table row: ordered cell strings, empty cells allowed
pub type RawRow = Vec<String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Width of the widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Content of a single physical page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPage {
    /// 1-based page index
    pub index: usize,
    pub tables: Vec<RawTable>,
    pub lines: Vec<String>,
}

impl RawPage {
    pub fn new(index: usize, tables: Vec<RawTable>, lines: Vec<String>) -> Self {
        Self { index, tables, lines }
    }

    /// A page with only text, as produced when table detection finds nothing
    pub fn text_only(index: usize, text: &str) -> Self {
        Self {
            index,
            tables: Vec::new(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}
