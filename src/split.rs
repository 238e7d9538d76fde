//! Splitting a PDF into chapter files
//!
//! The [`Splitter`] loads a document once, detects chapter headings in its
//! page text and writes one PDF per chapter. When fewer than two headings are
//! found the document is cut into fixed-size sections instead.

use std::path::{Path, PathBuf};
use lopdf::Document;
use tracing::{error, info, warn};

use crate::chapters::{chapter_ranges, find_chapter_breaks, ChapterBreak, ChapterPatterns};
use crate::error::{Error, Result};
use crate::pdf::{document_metadata, extract_all_pages, extract_page_range, extract_page_text, write_document, PdfMetadata};
use crate::sanitize::{sanitize_filename, unique_path};

/// Default section size when no chapters are found
pub const DEFAULT_PAGES_PER_SECTION: usize = 10;

/// Options for splitting a PDF
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Output directory; defaults to `<stem>_chapters` next to the input
    pub output_dir: Option<PathBuf>,
    /// Pages per section for the even-split fallback
    pub pages_per_section: usize,
    /// Heading patterns used for chapter detection
    pub patterns: ChapterPatterns,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output_dir: None,
            pages_per_section: DEFAULT_PAGES_PER_SECTION,
            patterns: ChapterPatterns::new(),
        }
    }
}

/// How a document ended up being split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    Chapters,
    Even,
}

/// One written output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub filename: String,
    pub title: String,
    /// 0-based, inclusive
    pub start_page: usize,
    /// 0-based, inclusive
    pub end_page: usize,
    pub page_count: usize,
}

/// Result of a split run
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub mode: SplitMode,
    pub output_dir: PathBuf,
    pub outputs: Vec<OutputFile>,
    /// Human-readable description of every part that failed to write
    pub failures: Vec<String>,
}

impl SplitReport {
    /// True when every part was written and at least one file exists
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.outputs.is_empty()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.outputs.iter().map(|o| o.filename.clone()).collect()
    }
}

/// File name for a detected chapter
pub fn chapter_filename(number: usize, title: &str) -> String {
    format!("第{:02}章_{}.pdf", number, sanitize_filename(title))
}

/// File name for an even-split section (pages are 0-based, inclusive)
pub fn section_filename(number: usize, start: usize, end: usize) -> String {
    format!("第{:02}部分_第{}-{}页.pdf", number, start + 1, end + 1)
}

/// Splits a single PDF file
#[derive(Debug, Clone)]
pub struct Splitter {
    pdf_path: PathBuf,
    output_dir: PathBuf,
    pages_per_section: usize,
    patterns: ChapterPatterns,
}

impl Splitter {
    pub fn new(pdf_path: impl Into<PathBuf>, options: SplitOptions) -> Result<Self> {
        if options.pages_per_section == 0 {
            return Err(Error::InvalidSectionSize);
        }

        let pdf_path = pdf_path.into();
        let output_dir = options
            .output_dir
            .unwrap_or_else(|| default_output_dir(&pdf_path));

        Ok(Self {
            pdf_path,
            output_dir,
            pages_per_section: options.pages_per_section,
            patterns: options.patterns,
        })
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Add a heading pattern after the existing ones
    pub fn add_custom_pattern(&mut self, pattern: &str) -> Result<()> {
        self.patterns.add_custom(pattern)
    }

    /// Load the document after checking the file is a plausible PDF
    fn load(&self) -> Result<Document> {
        let path = &self.pdf_path;

        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound(path.clone()),
            _ => Error::Io(e),
        })?;

        if !metadata.is_file() {
            return Err(Error::NotAFile(path.clone()));
        }
        if metadata.len() == 0 {
            return Err(Error::EmptyFile(path.clone()));
        }

        let doc = Document::load(path)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.clone()));
        }

        Ok(doc)
    }

    /// Check that the input exists, parses and has pages
    ///
    /// A first page without extractable text is only worth a warning:
    /// scanned documents still split evenly.
    pub fn validate(&self) -> Result<()> {
        let doc = self.load()?;

        if extract_page_text(&doc, 0).trim().is_empty() {
            warn!(path = %self.pdf_path.display(), "first page has no extractable text");
        }

        Ok(())
    }

    /// Basic document information
    pub fn info(&self) -> Result<PdfMetadata> {
        let doc = self.load()?;
        document_metadata(&doc, &self.pdf_path)
    }

    /// Detect chapter headings without writing anything
    pub fn find_chapter_breaks(&self) -> Result<Vec<ChapterBreak>> {
        let doc = self.load()?;
        Ok(self.detect(&doc))
    }

    fn detect(&self, doc: &Document) -> Vec<ChapterBreak> {
        let texts = extract_all_pages(doc);
        find_chapter_breaks(&texts, &self.patterns)
    }

    fn create_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        info!(dir = %self.output_dir.display(), "output directory ready");
        Ok(())
    }

    /// Split by detected chapters, falling back to even sections
    pub fn split_by_chapters(&self) -> Result<SplitReport> {
        let doc = self.load()?;
        self.create_output_dir()?;

        let breaks = self.detect(&doc);

        if breaks.is_empty() {
            warn!("no chapter markers found, splitting evenly");
            return self.split_document_evenly(&doc);
        }
        if breaks.len() == 1 {
            warn!("only one chapter found, detection is likely wrong; splitting evenly");
            return self.split_document_evenly(&doc);
        }

        let total_pages = doc.get_pages().len();
        let mut report = self.empty_report(SplitMode::Chapters);

        for (index, range) in chapter_ranges(&breaks, total_pages).into_iter().enumerate() {
            let number = index + 1;

            if range.start > range.end {
                warn!(chapter = number, start = range.start, end = range.end, "invalid chapter range");
                continue;
            }

            let filename = chapter_filename(number, &range.title);
            match self.write_part(&doc, range.start, range.end, &filename) {
                Ok(written) => report.outputs.push(OutputFile {
                    filename: written,
                    title: range.title,
                    start_page: range.start,
                    end_page: range.end,
                    page_count: range.end - range.start + 1,
                }),
                Err(e) => {
                    error!(chapter = number, error = %e, "failed to write chapter");
                    report.failures.push(format!("chapter {number}: {e}"));
                }
            }
        }

        self.log_outcome(&report);
        Ok(report)
    }

    /// Split into sections of `pages_per_section` pages
    pub fn split_evenly(&self) -> Result<SplitReport> {
        let doc = self.load()?;
        self.create_output_dir()?;
        self.split_document_evenly(&doc)
    }

    fn split_document_evenly(&self, doc: &Document) -> Result<SplitReport> {
        let total_pages = doc.get_pages().len();
        let mut report = self.empty_report(SplitMode::Even);
        let mut section = 1;

        info!(pages_per_section = self.pages_per_section, "splitting evenly");

        for start in (0..total_pages).step_by(self.pages_per_section) {
            let end = (start + self.pages_per_section - 1).min(total_pages - 1);
            let filename = section_filename(section, start, end);

            match self.write_part(doc, start, end, &filename) {
                Ok(written) => {
                    report.outputs.push(OutputFile {
                        filename: written,
                        title: format!("Pages {}-{}", start + 1, end + 1),
                        start_page: start,
                        end_page: end,
                        page_count: end - start + 1,
                    });
                    section += 1;
                }
                Err(e) => {
                    error!(section, error = %e, "failed to write section");
                    report.failures.push(format!("pages {}-{}: {e}", start + 1, end + 1));
                }
            }
        }

        self.log_outcome(&report);
        Ok(report)
    }

    /// Extract a page range and write it, returning the final file name
    fn write_part(&self, doc: &Document, start: usize, end: usize, filename: &str) -> Result<String> {
        let part = extract_page_range(doc, start, end)?;
        let path = unique_path(&self.output_dir.join(filename));

        write_document(part, &path)?;

        let written = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| filename.to_string());

        info!(file = %written, first = start + 1, last = end + 1, pages = end - start + 1, "created");
        Ok(written)
    }

    fn empty_report(&self, mode: SplitMode) -> SplitReport {
        SplitReport {
            mode,
            output_dir: self.output_dir.clone(),
            outputs: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn log_outcome(&self, report: &SplitReport) {
        if report.failures.is_empty() {
            info!(files = report.outputs.len(), dir = %report.output_dir.display(), "split finished");
        } else {
            warn!(
                files = report.outputs.len(),
                failed = report.failures.len(),
                dir = %report.output_dir.display(),
                "some parts failed to split"
            );
        }
    }
}

/// `<parent>/<stem>_chapters`
pub fn default_output_dir(pdf_path: &Path) -> PathBuf {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let parent = pdf_path.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{stem}_chapters"))
}
