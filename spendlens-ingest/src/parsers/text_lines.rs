//! Text Fallback Interpreter.
//!
//! Expected extracted-text rows (GPay style, several per line possible):
//!   01Oct,2025 Paid to Shiv Kumar ₹85 08:38AM UPI Transaction ID: 5274...
//!   01-06-2024 Paid to Electricity Board Rs.1200
//!
//! Each date occurrence starts a segment that runs to the next date. When
//! the last segment of a line has no amount, up to `LOOKAHEAD_LINES`
//! following date-free lines are appended to it. Lower precision than the
//! table path by nature; the normalizer does not trust its output.

use regex::Regex;
use spendlens_core::{CandidateTransaction, Direction, SourceKind};
use std::sync::OnceLock;

use crate::patterns;

const LOOKAHEAD_LINES: usize = 2;

/// Statement header lines, compared with spaces removed
const HEADER_MARKERS: &[&str] = &[
    "date&time",
    "transactiondetails",
    "transactionstatement",
    "statementperiod",
    "sentreceived",
];

fn noise_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)\b\d{1,2}:\d{2}(?::\d{2})?\s*(?:am|pm)?",
            r"|upi\s*transaction\s*id\s*:?\s*\w*",
            r"|paid\s*by\s*[a-z][a-z\s]*?\d+",
        ))
        .expect("noise regex")
    })
}

fn is_header(line: &str) -> bool {
    let squashed: String = line
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    HEADER_MARKERS.iter().any(|m| squashed.contains(m))
}

/// Strip times, UPI ids and payer-bank tokens; collapse whitespace.
pub fn clean_description(raw: &str) -> String {
    let stripped = noise_re().replace_all(raw, " ");
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .to_string()
}

fn segment_candidate(segment: &str, date: &str, page: usize) -> Option<CandidateTransaction> {
    let rest = segment.replacen(date, " ", 1);
    let amount = patterns::find_amount(&rest)?;
    let mut remainder = String::with_capacity(rest.len());
    remainder.push_str(&rest[..amount.start]);
    remainder.push(' ');
    remainder.push_str(&rest[amount.end..]);

    let raw_direction = Direction::keyword_in(&remainder)
        .or_else(|| patterns::sign_marker(&amount.text))
        .map(str::to_string);

    Some(CandidateTransaction {
        raw_date: date.to_string(),
        raw_description: clean_description(&remainder),
        raw_amount: amount.text,
        raw_direction,
        source_page: page,
        source_kind: SourceKind::Text,
    })
}

/// Recover candidates from a page's text lines.
pub fn interpret_lines(lines: &[String], page: usize) -> Vec<CandidateTransaction> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        let mut consumed = 0;
        if line.is_empty() || is_header(line) {
            i += 1;
            continue;
        }

        let dates = patterns::find_dates(line);
        for (k, date) in dates.iter().enumerate() {
            let end = dates.get(k + 1).map(|d| d.start()).unwrap_or(line.len());
            let mut segment = line[date.start()..end].to_string();

            let is_last = k + 1 == dates.len();
            let has_amount =
                |s: &str| patterns::find_amount(&s.replacen(date.as_str(), " ", 1)).is_some();
            if is_last && !has_amount(&segment) {
                for step in 1..=LOOKAHEAD_LINES {
                    let Some(next) = lines.get(i + step) else {
                        break;
                    };
                    let next = next.trim();
                    if patterns::looks_like_date(next) || is_header(next) {
                        break;
                    }
                    segment.push(' ');
                    segment.push_str(next);
                    consumed = step;
                    if has_amount(&segment) {
                        break;
                    }
                }
            }

            if let Some(candidate) = segment_candidate(&segment, date.as_str(), page) {
                out.push(candidate);
            }
        }

        i += 1 + consumed;
    }

    out
}
