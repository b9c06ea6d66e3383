//! Positioned page text.
//!
//! The content stream is walked with a minimal text state (CTM, text and
//! line matrices, font, leading), every shown string becomes a `TextSpan`
//! at its origin on the page, and spans are then grouped into rows by
//! baseline and into columns by left edge.
//!
//! Glyph widths are not read from the font; a span's width is estimated
//! from its length and the font size. That is enough to keep visibly
//! separate cells apart and to merge words emitted one string at a time.

use std::collections::BTreeMap;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Encoding, Object, ObjectId};
use spendlens_core::{PageError, RawRow, RawTable};
use tracing::debug;

use crate::patterns;

/// Mean glyph advance, as a share of the font size
const GLYPH_WIDTH: f32 = 0.5;
/// Baselines closer than this (points) share a row
const ROW_TOLERANCE: f32 = 3.0;
/// Left edges closer than this (points) share a column
const COLUMN_TOLERANCE: f32 = 10.0;
/// Gap between spans, in font sizes, under which they form one cell
const CELL_GAP: f32 = 1.0;
/// TJ adjustment (thousandths of an em) read as a word break
const TJ_WORD_BREAK: f32 = -100.0;

const MIN_COLUMNS: usize = 3;
const MIN_ROWS: usize = 2;

/// One string shown on the page, in page space with the origin at the
/// bottom left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub size: f32,
}

impl TextSpan {
    pub fn new(text: impl Into<String>, x: f32, y: f32, size: f32) -> Self {
        let text = text.into();
        let width = estimated_width(&text, size);
        Self {
            text,
            x,
            y,
            width,
            size,
        }
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Dates and amounts are whole cells on their own.
    fn is_value(&self) -> bool {
        let t = self.text.trim();
        patterns::looks_like_date(t) || patterns::looks_like_amount(t)
    }
}

fn estimated_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

/// Spans sharing a baseline, left to right, with neighbours merged into
/// cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRow {
    pub y: f32,
    pub cells: Vec<TextSpan>,
}

impl TextRow {
    /// Cells joined by single spaces; whitespace inside a span is kept.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Affine matrix `[a b c d e f]` in PDF row-vector order.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`
    fn then(self, other: Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn vertical_scale(self) -> f32 {
        self.0[2].hypot(self.0[3])
    }
}

fn number(op: &Operation, i: usize) -> f32 {
    op.operands
        .get(i)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0)
}

fn matrix(op: &Operation) -> Matrix {
    Matrix(std::array::from_fn(|i| number(op, i)))
}

struct TextState<'a> {
    ctm: Matrix,
    saved: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    leading: f32,
    size: f32,
    encoding: Option<&'a Encoding<'a>>,
    spans: Vec<TextSpan>,
}

impl<'a> TextState<'a> {
    fn new() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            leading: 0.0,
            size: 0.0,
            encoding: None,
            spans: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = Matrix::translate(tx, ty).then(self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    fn decode(&self, bytes: &[u8]) -> String {
        self.encoding
            .and_then(|enc| Document::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Show one string or a TJ array as a single span, then advance.
    fn show(&mut self, operand: &Object) {
        let mut text = String::new();
        let mut advance = 0.0;
        match operand {
            Object::String(bytes, _) => {
                let s = self.decode(bytes);
                advance += estimated_width(&s, self.size);
                text.push_str(&s);
            }
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => {
                            let s = self.decode(bytes);
                            advance += estimated_width(&s, self.size);
                            text.push_str(&s);
                        }
                        other => {
                            let adjust = other.as_float().unwrap_or(0.0);
                            advance -= adjust / 1000.0 * self.size;
                            if adjust < TJ_WORD_BREAK && !text.ends_with(' ') {
                                text.push(' ');
                            }
                        }
                    }
                }
            }
            _ => return,
        }

        let placed = self.tm.then(self.ctm);
        let [.., x, y] = placed.0;
        if !text.trim().is_empty() {
            let size = self.size * placed.vertical_scale();
            self.spans.push(TextSpan::new(text, x, y, size));
        }
        self.tm = Matrix::translate(advance, 0.0).then(self.tm);
    }

    fn apply(&mut self, op: &Operation, encodings: &'a BTreeMap<Vec<u8>, Encoding<'a>>) {
        match op.operator.as_str() {
            "q" => self.saved.push(self.ctm),
            "Q" => self.ctm = self.saved.pop().unwrap_or(Matrix::IDENTITY),
            "cm" => self.ctm = matrix(op).then(self.ctm),
            "BT" => {
                self.tm = Matrix::IDENTITY;
                self.tlm = Matrix::IDENTITY;
            }
            "Tf" => {
                self.encoding = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
                self.size = number(op, 1);
            }
            "TL" => self.leading = number(op, 0),
            "Td" => self.move_line(number(op, 0), number(op, 1)),
            "TD" => {
                self.leading = -number(op, 1);
                self.move_line(number(op, 0), number(op, 1));
            }
            "Tm" => {
                self.tlm = matrix(op);
                self.tm = self.tlm;
            }
            "T*" => self.next_line(),
            "Tj" | "TJ" => {
                if let Some(operand) = op.operands.first() {
                    self.show(operand);
                }
            }
            "'" | "\"" => {
                self.next_line();
                if let Some(operand) = op.operands.last() {
                    self.show(operand);
                }
            }
            _ => {}
        }
    }
}

/// Concatenated, decoded content streams of a page. Unlike
/// `Document::get_page_content`, a stream that cannot be decoded is an
/// error rather than raw bytes.
fn page_content(doc: &Document, page_id: ObjectId, page: usize) -> Result<Vec<u8>, PageError> {
    let failed = |reason: String| PageError::ExtractionFailed { page, reason };
    let mut content = Vec::new();
    for id in doc.get_page_contents(page_id) {
        let stream = doc
            .get_object(id)
            .and_then(Object::as_stream)
            .map_err(|e| failed(format!("content stream {} {}: {e}", id.0, id.1)))?;
        let data = stream
            .get_plain_content()
            .map_err(|e| failed(format!("content stream {} {} not decodable: {e}", id.0, id.1)))?;
        content.extend_from_slice(&data);
        content.push(b'\n');
    }
    Ok(content)
}

/// Every string shown on the page, in content-stream order.
pub fn page_spans(
    doc: &Document,
    page_id: ObjectId,
    page: usize,
) -> Result<Vec<TextSpan>, PageError> {
    let failed = |reason: String| PageError::ExtractionFailed { page, reason };

    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| failed(format!("fonts: {e}")))?;
    let encodings: BTreeMap<Vec<u8>, Encoding> = fonts
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(enc) => Some((name, enc)),
            Err(e) => {
                let font = String::from_utf8_lossy(&name);
                debug!(page, %font, error = %e, "font encoding unavailable");
                None
            }
        })
        .collect();

    let data = page_content(doc, page_id, page)?;
    let content = Content::decode(&data).map_err(|e| failed(format!("content: {e}")))?;

    let mut state = TextState::new();
    for op in &content.operations {
        state.apply(op, &encodings);
    }
    Ok(state.spans)
}

/// Group spans into rows, top of the page first. A span joins the first
/// row whose baseline is within `ROW_TOLERANCE`; within a row, spans
/// closer than `CELL_GAP` font sizes are merged into one cell unless
/// either side is a date or an amount.
pub fn group_rows(spans: Vec<TextSpan>) -> Vec<TextRow> {
    let mut rows: Vec<(f32, Vec<TextSpan>)> = Vec::new();
    for span in spans {
        match rows
            .iter_mut()
            .find(|(y, _)| (span.y - *y).abs() <= ROW_TOLERANCE)
        {
            Some((_, members)) => members.push(span),
            None => rows.push((span.y, vec![span])),
        }
    }
    rows.sort_by(|a, b| b.0.total_cmp(&a.0));

    rows.into_iter()
        .map(|(y, mut members)| {
            members.sort_by(|a, b| a.x.total_cmp(&b.x));
            TextRow {
                y,
                cells: merge_cells(members),
            }
        })
        .collect()
}

fn merge_cells(spans: Vec<TextSpan>) -> Vec<TextSpan> {
    let mut cells: Vec<TextSpan> = Vec::new();
    for span in spans {
        if let Some(last) = cells.last_mut() {
            let gap = span.x - last.right();
            if gap < last.size.max(span.size) * CELL_GAP && !last.is_value() && !span.is_value() {
                last.text.push(' ');
                last.text.push_str(span.text.trim());
                last.width = span.right() - last.x;
                continue;
            }
        }
        cells.push(TextSpan {
            text: span.text.trim().to_string(),
            ..span
        });
    }
    cells
}

/// Runs of consecutive rows with at least `MIN_COLUMNS` cells and a cell
/// count within one of the run's first row.
fn table_regions(rows: &[TextRow]) -> Vec<&[TextRow]> {
    let mut regions = Vec::new();
    let mut start = 0;
    let mut expected: Option<usize> = None;

    for (i, row) in rows.iter().enumerate() {
        let n = row.cells.len();
        let fits = n >= MIN_COLUMNS && expected.is_none_or(|e| n.abs_diff(e) <= 1);
        if fits {
            if expected.is_none() {
                start = i;
                expected = Some(n);
            }
            continue;
        }
        if expected.is_some() && i - start >= MIN_ROWS {
            regions.push(&rows[start..i]);
        }
        if n >= MIN_COLUMNS {
            start = i;
            expected = Some(n);
        } else {
            expected = None;
        }
    }
    if expected.is_some() && rows.len() - start >= MIN_ROWS {
        regions.push(&rows[start..]);
    }
    regions
}

/// Left edges of the region's columns: sorted cell x positions, a new
/// column wherever an edge is more than `COLUMN_TOLERANCE` past the
/// previous column's.
fn column_edges(region: &[TextRow]) -> Vec<f32> {
    let mut xs: Vec<f32> = region
        .iter()
        .flat_map(|r| r.cells.iter().map(|c| c.x))
        .collect();
    xs.sort_by(f32::total_cmp);

    let mut edges: Vec<f32> = Vec::new();
    for x in xs {
        if edges.last().is_none_or(|last| x - last > COLUMN_TOLERANCE) {
            edges.push(x);
        }
    }
    edges
}

fn build_table(region: &[TextRow]) -> RawTable {
    let edges = column_edges(region);
    let rows = region
        .iter()
        .map(|row| {
            let mut out: RawRow = vec![String::new(); edges.len()];
            for cell in &row.cells {
                let col = edges
                    .iter()
                    .rposition(|&e| e <= cell.x)
                    .unwrap_or(0);
                if !out[col].is_empty() {
                    out[col].push(' ');
                }
                out[col].push_str(&cell.text);
            }
            out
        })
        .collect();
    RawTable::new(rows)
}

/// Tables recovered from cell alignment across rows.
pub fn detect_tables(rows: &[TextRow]) -> Vec<RawTable> {
    table_regions(rows)
        .into_iter()
        .map(build_table)
        .filter(|t| t.column_count() >= MIN_COLUMNS)
        .collect()
}
