//! Chapter boundary detection over extracted page text

use tracing::{debug, info};
use super::patterns::ChapterPatterns;

/// Lines checked at the top of every page
const HEAD_LINES: usize = 10;
/// Pages longer than this also get their middle lines checked
const LONG_PAGE_LINES: usize = 20;
/// Candidate lines outside this length range are treated as body text
const MIN_TITLE_CHARS: usize = 2;
const MAX_TITLE_CHARS: usize = 100;
/// Titles are cut to this many characters
const TITLE_CHARS: usize = 60;

/// A detected chapter start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterBreak {
    /// 0-based page index
    pub page: usize,
    /// Heading line, truncated
    pub title: String,
}

/// A chapter's inclusive, 0-based page span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRange {
    pub start: usize,
    pub end: usize,
    pub title: String,
}

/// Lines that may hold a heading: the top of the page, plus a window around
/// the middle for long pages (chapters that start mid-page)
fn candidate_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut candidates: Vec<&str> = lines.iter().take(HEAD_LINES).copied().collect();

    if lines.len() > LONG_PAGE_LINES {
        let mid = lines.len() / 2;
        candidates.extend_from_slice(&lines[mid - 2..mid + 3]);
    }

    candidates
}

fn truncate_title(line: &str) -> String {
    line.chars().take(TITLE_CHARS).collect::<String>().trim().to_string()
}

/// Find the first heading on a page, if any
fn find_heading(text: &str, patterns: &ChapterPatterns) -> Option<String> {
    candidate_lines(text)
        .into_iter()
        .map(str::trim)
        .filter(|line| {
            let chars = line.chars().count();
            (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&chars)
        })
        .find(|line| patterns.matches(line))
        .map(truncate_title)
}

/// Scan page texts for chapter headings
///
/// At most one break is reported per page, and breaks come back in page order.
pub fn find_chapter_breaks(pages: &[String], patterns: &ChapterPatterns) -> Vec<ChapterBreak> {
    info!(pages = pages.len(), "scanning pages for chapter headings");

    let mut breaks: Vec<ChapterBreak> = Vec::new();

    for (page, text) in pages.iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }

        if let Some(title) = find_heading(text, patterns) {
            info!(page = page + 1, title = %title, "found chapter");
            breaks.push(ChapterBreak { page, title });
        } else {
            debug!(page = page + 1, "no heading");
        }
    }

    info!(chapters = breaks.len(), "chapter scan finished");
    breaks
}

/// Pair each break with the page before the next one (or the last page)
///
/// Breaks at or beyond `total_pages` are dropped.
pub fn chapter_ranges(breaks: &[ChapterBreak], total_pages: usize) -> Vec<ChapterRange> {
    let valid: Vec<&ChapterBreak> = breaks.iter().filter(|b| b.page < total_pages).collect();

    valid
        .iter()
        .enumerate()
        .map(|(i, brk)| {
            let end = match valid.get(i + 1) {
                Some(next) => next.page.saturating_sub(1).max(brk.page),
                None => total_pages - 1,
            };
            ChapterRange {
                start: brk.page,
                end,
                title: brk.title.clone(),
            }
        })
        .collect()
}
