//! Terminal tables, JSON view and CSV export.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use serde::Serialize;
use spendlens_core::{DiagnosticsLog, RejectReason, Transaction};
use spendlens_finance::{AnalysisResult, RunStatus, StatementReport, TrendPoint};
use std::path::Path;

pub fn fmt_money(d: &Decimal) -> String {
    format!("₹{:.2}", d)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn summary_table(a: &AnalysisResult) -> Table {
    let mut rows = vec![
        vec!["Total spent".to_string(), fmt_money(&a.total_spent)],
        vec!["Total income".to_string(), fmt_money(&a.total_income)],
        vec!["Net balance".to_string(), fmt_money(&a.net_balance)],
        vec!["Transactions".to_string(), a.transaction_count.to_string()],
        vec!["Average spend".to_string(), fmt_money(&a.average_transaction_size)],
        vec!["Daily average".to_string(), fmt_money(&a.daily_average)],
    ];
    if let Some(r) = &a.date_range {
        rows.push(vec![
            "Period".to_string(),
            format!("{} to {} ({} days)", r.start, r.end, r.days),
        ]);
    }
    if let Some(t) = &a.largest_transaction {
        rows.push(vec![
            "Largest spend".to_string(),
            format!("{} on {} ({})", fmt_money(&t.amount), t.date, t.description),
        ]);
    }
    pretty_table(&["Metric", "Value"], rows)
}

pub fn category_table(a: &AnalysisResult) -> Table {
    let mut totals: Vec<_> = a.category_totals.iter().collect();
    totals.sort_by(|x, y| y.1.cmp(x.1).then_with(|| x.0.cmp(y.0)));
    let rows = totals
        .into_iter()
        .map(|(c, amt)| vec![c.to_string(), fmt_money(amt)])
        .collect();
    pretty_table(&["Category", "Spent"], rows)
}

pub fn monthly_table(a: &AnalysisResult) -> Table {
    let rows = a
        .monthly_totals
        .iter()
        .map(|(m, amt)| vec![m.to_string(), fmt_money(amt)])
        .collect();
    pretty_table(&["Month", "Spent"], rows)
}

pub fn merchant_table(a: &AnalysisResult) -> Table {
    let rows = a
        .top_merchants
        .iter()
        .map(|m| {
            vec![
                m.merchant.clone(),
                fmt_money(&m.total),
                m.count.to_string(),
                fmt_money(&m.average),
            ]
        })
        .collect();
    pretty_table(&["Merchant", "Total", "Count", "Average"], rows)
}

pub fn transaction_table(txns: &[&Transaction]) -> Table {
    let rows = txns
        .iter()
        .map(|t| {
            vec![
                t.date.to_string(),
                t.description.clone(),
                fmt_money(&t.amount),
                t.direction.to_string(),
                t.category_or_other().to_string(),
            ]
        })
        .collect();
    pretty_table(&["Date", "Description", "Amount", "Type", "Category"], rows)
}

pub fn trend_table(points: &[TrendPoint]) -> Table {
    let rows = points
        .iter()
        .map(|p| vec![p.period.clone(), fmt_money(&p.amount)])
        .collect();
    pretty_table(&["Period", "Spent"], rows)
}

pub fn diagnostics_table(log: &DiagnosticsLog) -> Table {
    let rows = log
        .pages()
        .map(|p| {
            vec![
                p.page_index.to_string(),
                p.tables_found.to_string(),
                format!("{:?}", p.strategy),
                p.candidate_count.to_string(),
                p.errors.join("; "),
            ]
        })
        .collect();
    pretty_table(&["Page", "Tables", "Strategy", "Candidates", "Errors"], rows)
}

/// Guidance shown when a readable document produced nothing.
pub fn troubleshooting(log: &DiagnosticsLog) -> String {
    let r = log.rejections();
    let mut out = String::from("No transactions found in this statement.\n");
    out.push_str(&format!(
        "  candidates recovered: {}, rejected: {}, page errors: {}\n",
        log.candidate_total(),
        r.total(),
        log.error_count()
    ));
    for reason in [
        RejectReason::UnparsableDate,
        RejectReason::UnparsableAmount,
        RejectReason::ZeroAmount,
        RejectReason::EmptyDescription,
    ] {
        let n = r.get(reason);
        if n > 0 {
            out.push_str(&format!("  {n} dropped: {reason}\n"));
        }
    }
    if log.candidate_total() == 0 {
        out.push_str("  The PDF may be scanned (image only) or use an unsupported layout.\n");
    } else if r.unparsable_date > 0 {
        out.push_str("  Add the statement's date format to date_formats in the config file.\n");
    }
    out.push_str("  Re-run with --debug to see per-page samples.\n");
    out
}

#[derive(Serialize)]
pub struct JsonView<'a> {
    pub status: RunStatus,
    pub transactions: Vec<&'a Transaction>,
    pub analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<&'a [TrendPoint]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<&'a DiagnosticsLog>,
}

impl<'a> JsonView<'a> {
    pub fn new(
        report: &'a StatementReport,
        transactions: Vec<&'a Transaction>,
        trends: Option<&'a [TrendPoint]>,
        debug: bool,
    ) -> Self {
        Self {
            status: report.status,
            transactions,
            analysis: &report.analysis,
            trends,
            diagnostics: debug.then_some(&report.diagnostics),
        }
    }
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    direction: &'static str,
    category: &'static str,
    source_page: usize,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            date: t.date.format("%Y-%m-%d").to_string(),
            description: &t.description,
            amount: format!("{:.2}", t.amount),
            direction: t.direction.as_str(),
            category: t.category_or_other().label(),
            source_page: t.source_page,
        }
    }
}

pub fn write_csv<W: std::io::Write>(writer: W, txns: &[&Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for t in txns {
        wtr.serialize(CsvRow::from(*t))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, txns: &[&Transaction]) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv(file, txns).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use spendlens_core::{Category, Direction};

    #[test]
    fn test_csv_columns() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        let t = Transaction::new(date, "SWIGGY ORDER", Decimal::new(345, 0), Direction::Debit, 2)
            .with_category(Category::FoodDining);
        let mut buf = Vec::new();
        write_csv(&mut buf, &[&t]).unwrap();
        let s = String::from_utf8(buf).unwrap();
        let mut lines = s.lines();
        assert_eq!(
            lines.next(),
            Some("date,description,amount,direction,category,source_page")
        );
        assert_eq!(
            lines.next(),
            Some("2024-05-12,SWIGGY ORDER,345.00,debit,Food & Dining,2")
        );
    }

    #[test]
    fn test_troubleshooting_mentions_rejections() {
        let mut log = DiagnosticsLog::new(false);
        log.record_rejection(RejectReason::ZeroAmount);
        let msg = troubleshooting(&log);
        assert!(msg.contains("No transactions found"));
        assert!(msg.contains("1 dropped: amount is zero"));
    }

    #[test]
    fn test_money_format() {
        assert_eq!(fmt_money(&Decimal::new(1200, 0)), "₹1200.00");
        assert_eq!(fmt_money(&Decimal::new(-12345, 2)), "₹-123.45");
    }
}
