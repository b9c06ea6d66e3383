//! Table Row Interpreter.
//!
//! Every column is scored for how date-like, amount-like, direction-like
//! and text-like its cells are. Roles are then assigned greedily: date
//! column, amount column, an optional direction column, and finally the
//! description column. Ties go to the leftmost column.
//!
//! Rows whose date cell holds no date are headers, totals or section
//! breaks and are skipped. Everything else becomes a candidate, even
//! with an empty description; validity is decided by the normalizer.

use spendlens_core::{CandidateTransaction, Direction, RawRow, RawTable, SourceKind};

use crate::patterns;

/// Share of a column's cells that must be exact direction labels
const MIN_DIRECTION_RATIO: f64 = 0.5;

/// Exact cell values that mark a type column
const DIRECTION_LABELS: &[&str] = &[
    "debit", "credit", "dr", "cr", "paid", "received", "sent", "withdrawal", "deposit", "refund",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Amount,
    Description,
    Direction,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnScore {
    /// Share of non-empty cells holding a date
    pub date: f64,
    /// Mean amount strength over non-empty cells
    pub amount: f64,
    /// Share of non-empty cells that are direction labels
    pub direction: f64,
    /// Mean length of cells that are neither date nor amount
    pub text: f64,
}

fn is_direction_label(cell: &str) -> bool {
    let c = cell.trim().trim_end_matches('.').to_lowercase();
    DIRECTION_LABELS.contains(&c.as_str())
}

/// Score one column from its cells. Pure; empty cells are ignored.
pub fn score_column<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnScore {
    let mut filled = 0usize;
    let mut dates = 0usize;
    let mut amount = 0.0;
    let mut labels = 0usize;
    let mut text_len = 0usize;
    let mut text_cells = 0usize;

    for cell in cells {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        filled += 1;
        let is_date = patterns::looks_like_date(cell);
        let strength = patterns::amount_strength(cell);
        if is_date {
            dates += 1;
        }
        amount += strength;
        if is_direction_label(cell) {
            labels += 1;
        }
        if !is_date && strength == 0.0 {
            text_len += cell.chars().count();
            text_cells += 1;
        }
    }

    if filled == 0 {
        return ColumnScore::default();
    }
    let n = filled as f64;
    ColumnScore {
        date: dates as f64 / n,
        amount: amount / n,
        direction: labels as f64 / n,
        text: if text_cells == 0 {
            0.0
        } else {
            text_len as f64 / text_cells as f64
        },
    }
}

fn cell(row: &RawRow, col: usize) -> &str {
    row.get(col).map(String::as_str).unwrap_or("")
}

/// Highest-scoring free column above `min`; strict comparison keeps the
/// leftmost column on ties.
fn pick(
    scores: &[ColumnScore],
    roles: &[ColumnRole],
    min: f64,
    key: impl Fn(&ColumnScore) -> f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.iter().enumerate() {
        if roles[i] != ColumnRole::Other {
            continue;
        }
        let value = key(score);
        if value < min || value <= 0.0 {
            continue;
        }
        if best.is_none_or(|(_, b)| value > b) {
            best = Some((i, value));
        }
    }
    best.map(|(i, _)| i)
}

/// Assign a role to every column of the table.
pub fn infer_roles(table: &RawTable) -> Vec<ColumnRole> {
    let width = table.column_count();
    let scores: Vec<ColumnScore> = (0..width)
        .map(|col| score_column(table.rows.iter().map(|r| cell(r, col))))
        .collect();
    let mut roles = vec![ColumnRole::Other; width];

    let Some(date_col) = pick(&scores, &roles, 0.0, |s| s.date) else {
        return roles;
    };
    roles[date_col] = ColumnRole::Date;

    if let Some(col) = pick(&scores, &roles, 0.0, |s| s.amount) {
        roles[col] = ColumnRole::Amount;
    }
    if let Some(col) = pick(&scores, &roles, MIN_DIRECTION_RATIO, |s| s.direction) {
        roles[col] = ColumnRole::Direction;
    }
    if let Some(col) = pick(&scores, &roles, 0.0, |s| s.text) {
        roles[col] = ColumnRole::Description;
    }

    roles
}

fn column_of(roles: &[ColumnRole], role: ColumnRole) -> Option<usize> {
    roles.iter().position(|r| *r == role)
}

/// Convert one table into candidates.
pub fn interpret_table(table: &RawTable, page: usize) -> Vec<CandidateTransaction> {
    if table.column_count() < 2 {
        return Vec::new();
    }
    let roles = infer_roles(table);
    let Some(date_col) = column_of(&roles, ColumnRole::Date) else {
        return Vec::new();
    };
    let amount_col = column_of(&roles, ColumnRole::Amount);
    let description_col = column_of(&roles, ColumnRole::Description);
    let direction_col = column_of(&roles, ColumnRole::Direction);

    let mut out = Vec::new();
    for row in &table.rows {
        let Some(date) = patterns::find_date(cell(row, date_col)) else {
            continue;
        };
        let raw_amount = amount_col
            .map(|c| cell(row, c).trim().to_string())
            .unwrap_or_default();
        let raw_description = description_col
            .map(|c| cell(row, c).trim().to_string())
            .unwrap_or_default();

        let raw_direction = direction_col
            .map(|c| cell(row, c).trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| patterns::sign_marker(&raw_amount).map(str::to_string))
            .or_else(|| Direction::keyword_in(&raw_description).map(str::to_string));

        out.push(CandidateTransaction {
            raw_date: date.as_str().to_string(),
            raw_description,
            raw_amount,
            raw_direction,
            source_page: page,
            source_kind: SourceKind::Table,
        });
    }

    out
}
