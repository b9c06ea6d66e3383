//! Date and amount recognizers shared by both interpreters and the normalizer.

use chrono::{Datelike, NaiveDate};
use regex::{Match, Regex};
use rust_decimal::Decimal;
use spendlens_core::{PipelineConfig, RejectReason};
use std::str::FromStr;
use std::sync::OnceLock;

/// Largest amount accepted as a real transaction
const MAX_AMOUNT: i64 = 10_000_000;

const MONTHS: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec";

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            concat!(
                r"(?i)\b(?:",
                r"\d{{4}}[-/]\d{{1,2}}[-/]\d{{1,2}}",
                r"|\d{{1,2}}[-/.]\d{{1,2}}[-/.]\d{{2,4}}",
                r"|\d{{1,2}}[\s-]*(?:{m})[a-z]*\.?[\s,-]*\d{{4}}",
                r"|(?:{m})[a-z]*\.?\s+\d{{1,2}},?\s*\d{{4}}",
                r")\b"
            ),
            m = MONTHS
        );
        Regex::new(&pattern).expect("date regex")
    })
}

/// A whole cell holding a number, optionally with currency, sign or Dr/Cr suffix
fn amount_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?i)^\s*[+-]?\s*\(?\s*(?P<ccy>₹|rs\.?|inr|\$)?\s*[+-]?\s*",
            r"(?P<num>\d[\d,]*(?P<frac>\.\d{1,2})?)",
            r"\s*\)?\s*(?:dr|cr)?\.?\s*$"
        ))
        .expect("amount cell regex")
    })
}

/// Currency-marked amount inside free text
fn amount_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:₹|\brs\.?|\binr\b\.?|\$)\s*(\d[\d,]*(?:\.\d{1,2})?)")
            .expect("amount text regex")
    })
}

/// Bare decimal amount inside free text, e.g. "1,200.00"
fn decimal_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|\s)([+-]?\d[\d,]*\.\d{2})(?:\s|$)").expect("decimal text regex")
    })
}

pub fn looks_like_date(cell: &str) -> bool {
    date_re().is_match(cell)
}

/// First date-shaped substring of `text`
pub fn find_date(text: &str) -> Option<Match<'_>> {
    date_re().find(text)
}

/// Every date-shaped substring of `text`, left to right
pub fn find_dates(text: &str) -> Vec<Match<'_>> {
    date_re().find_iter(text).collect()
}

/// How strongly a cell reads as an amount: 1.0 with a currency symbol or
/// decimals, 0.5 for a bare integer, 0.0 otherwise.
pub fn amount_strength(cell: &str) -> f64 {
    if looks_like_date(cell) {
        return 0.0;
    }
    match amount_cell_re().captures(cell) {
        Some(caps) if caps.name("ccy").is_some() || caps.name("frac").is_some() => 1.0,
        Some(_) => 0.5,
        None => 0.0,
    }
}

pub fn looks_like_amount(cell: &str) -> bool {
    amount_strength(cell) > 0.0
}

/// An amount found in free text: the full matched text (currency included)
/// and its byte range.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAmount {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Currency-marked amounts win over bare decimals.
pub fn find_amount(text: &str) -> Option<TextAmount> {
    if let Some(m) = amount_text_re().find(text) {
        return Some(TextAmount {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        });
    }
    decimal_text_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| TextAmount {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
}

/// Sign or Dr/Cr marker carried by an amount cell, as a direction marker.
pub fn sign_marker(raw: &str) -> Option<&'static str> {
    let lowered = raw.trim().to_lowercase();
    let lead_len = lowered.find(|c: char| c.is_ascii_digit()).unwrap_or(lowered.len());
    let lead = &lowered[..lead_len];
    let tail = lowered.trim_end_matches('.');
    let parenthesized = lead.contains('(') && lowered.ends_with(')');
    if lead.contains('-') || parenthesized || tail.ends_with("dr") {
        Some("-")
    } else if lead.contains('+') || tail.ends_with("cr") {
        Some("+")
    } else {
        None
    }
}

/// Parse a date against the configured formats, in order. A parse whose year
/// falls outside the configured window does not count.
pub fn parse_date(raw: &str, config: &PipelineConfig) -> Option<NaiveDate> {
    let cleaned = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let cleaned = cleaned.trim_end_matches(['.', ',']);
    if cleaned.is_empty() {
        return None;
    }
    config
        .date_formats
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(cleaned, fmt).ok())
        .find(|d| config.year_in_window(d.year()))
}

/// Parse an amount into a positive decimal. Currency symbols, thousands
/// separators, signs and Dr/Cr suffixes are stripped; the sign is the
/// direction's business, not the amount's.
pub fn parse_amount(raw: &str) -> Result<Decimal, RejectReason> {
    let mut s = raw.trim().to_lowercase();
    for suffix in ["dr.", "cr.", "dr", "cr"] {
        if let Some(stripped) = s.strip_suffix(suffix) {
            s = stripped.to_string();
            break;
        }
    }
    for token in ["₹", "inr", "rs.", "rs", "$"] {
        s = s.replace(token, "");
    }
    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '(' | ')'))
        .collect();
    let s = s.trim_start_matches(['+', '-']);
    if s.is_empty() {
        return Err(RejectReason::UnparsableAmount);
    }

    let value = Decimal::from_str(s).map_err(|_| RejectReason::UnparsableAmount)?;
    if value.is_sign_negative() || value > Decimal::from(MAX_AMOUNT) {
        return Err(RejectReason::UnparsableAmount);
    }
    if value.is_zero() {
        return Err(RejectReason::ZeroAmount);
    }
    Ok(value)
}
