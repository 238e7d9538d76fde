//! Page text extraction

use lopdf::Document;
use tracing::warn;

/// Strip control characters (keeping tab, LF and CR) and normalize line endings
pub(crate) fn clean_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .chars()
        .filter(|&c| {
            !matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
        })
        .collect()
}

/// Extract the text of one page (0-based index)
///
/// Extraction problems are logged and yield an empty string, so a single
/// unreadable page never aborts chapter detection.
pub fn extract_page_text(doc: &Document, page_index: usize) -> String {
    let total = doc.get_pages().len();
    if page_index >= total {
        warn!(page_index, total, "page index out of range");
        return String::new();
    }

    match doc.extract_text(&[page_index as u32 + 1]) {
        Ok(text) => clean_text(&text),
        Err(e) => {
            warn!(page = page_index + 1, error = %e, "failed to extract page text");
            String::new()
        }
    }
}

/// Extract the text of every page, in page order
pub fn extract_all_pages(doc: &Document) -> Vec<String> {
    let total = doc.get_pages().len();
    (0..total).map(|index| extract_page_text(doc, index)).collect()
}
