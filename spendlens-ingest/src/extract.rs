//! Page Content Extractor: PDF bytes to per-page tables and text lines.
//!
//! Only a document that cannot be opened at all is fatal. A page whose
//! content cannot be decoded becomes an empty page with the failure
//! recorded in diagnostics.

use lopdf::{Document, ObjectId};
use spendlens_core::{AnalysisError, DiagnosticsLog, PageError, RawPage};
use tracing::{debug, warn};

use crate::{layout, tables};

/// Open a PDF held in memory, trying `password` (or the empty user
/// password) when it is encrypted.
pub fn open_document(bytes: &[u8], password: Option<&str>) -> Result<Document, AnalysisError> {
    let mut doc = Document::load_mem(bytes).map_err(|e| AnalysisError::DocumentUnreadable {
        reason: e.to_string(),
    })?;

    if doc.is_encrypted() {
        doc.decrypt(password.unwrap_or(""))
            .map_err(|e| AnalysisError::DocumentUnreadable {
                reason: format!("encrypted document could not be decrypted: {e}"),
            })?;
    }

    Ok(doc)
}

/// Extract every page, in page order.
pub fn extract_pages(
    bytes: &[u8],
    password: Option<&str>,
    log: &mut DiagnosticsLog,
) -> Result<Vec<RawPage>, AnalysisError> {
    let doc = open_document(bytes, password)?;
    let pages = doc.get_pages();
    debug!(pages = pages.len(), "opened document");

    let pages = pages
        .into_iter()
        .map(|(number, page_id)| match extract_page(&doc, number, page_id) {
            Ok(page) => page,
            Err(err) => {
                warn!(error = %err, "page extraction failed");
                log.record_page_error(&err);
                RawPage::new(number as usize, Vec::new(), Vec::new())
            }
        })
        .collect();

    Ok(pages)
}

/// Rows come from glyph positions. Tables come from cell alignment, or,
/// when nothing lines up, from wide gaps kept inside the shown strings.
fn extract_page(doc: &Document, number: u32, page_id: ObjectId) -> Result<RawPage, PageError> {
    let index = number as usize;
    let spans = layout::page_spans(doc, page_id, index)?;
    let rows = layout::group_rows(spans);
    let lines: Vec<String> = rows.iter().map(layout::TextRow::text).collect();

    let mut found = layout::detect_tables(&rows);
    if found.is_empty() {
        found = tables::detect_tables(&lines);
    }
    debug!(page = index, rows = rows.len(), tables = found.len(), "extracted page");

    Ok(RawPage::new(index, found, lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let mut log = DiagnosticsLog::new(false);
        let err = extract_pages(b"definitely not a pdf", None, &mut log).unwrap_err();
        assert!(matches!(err, AnalysisError::DocumentUnreadable { .. }));
    }

    #[test]
    fn test_empty_input_is_unreadable() {
        let mut log = DiagnosticsLog::new(false);
        assert!(extract_pages(&[], None, &mut log).is_err());
    }
}
