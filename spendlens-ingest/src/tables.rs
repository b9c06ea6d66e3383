//! Recover tables from text that carries its own layout.
//!
//! Some generators show a whole row as one padded string, so glyph
//! positions say nothing about columns. There the columns are separated
//! by tabs or runs of two or more spaces. A run of consecutive lines that
//! each split into at least `MIN_COLUMNS` cells is treated as one table.

use regex::Regex;
use spendlens_core::{RawRow, RawTable};
use std::sync::OnceLock;

const MIN_COLUMNS: usize = 3;
const MIN_ROWS: usize = 2;

fn cell_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t+|\s{2,}").expect("cell split regex"))
}

pub fn split_cells(line: &str) -> RawRow {
    cell_split_re()
        .split(line.trim())
        .map(|c| c.trim().to_string())
        .collect()
}

pub fn detect_tables(lines: &[String]) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: Vec<RawRow> = Vec::new();

    for line in lines {
        let cells = split_cells(line);
        if cells.len() >= MIN_COLUMNS {
            current.push(cells);
            continue;
        }
        if current.len() >= MIN_ROWS {
            tables.push(RawTable::new(std::mem::take(&mut current)));
        } else {
            current.clear();
        }
    }
    if current.len() >= MIN_ROWS {
        tables.push(RawTable::new(current));
    }

    tables
}
