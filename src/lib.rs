//! PDF Chapter Splitter Library
//!
//! Splits a PDF book into one file per chapter.
//! This library provides functionality to:
//! - Detect chapter headings in page text with built-in or custom patterns
//! - Extract page ranges into standalone PDFs
//! - Fall back to fixed-size sections when no chapters are found
//! - Serve uploads and downloads over HTTP
//!
//! # Example
//!
//! ```no_run
//! use pdf_chapter_splitter::split::{SplitOptions, Splitter};
//!
//! let mut splitter = Splitter::new("book.pdf", SplitOptions::default())?;
//! splitter.add_custom_pattern("^Appendix")?;
//!
//! let report = splitter.split_by_chapters()?;
//! for file in &report.outputs {
//!     println!("{} (pages {}-{})", file.filename, file.start_page + 1, file.end_page + 1);
//! }
//! # Ok::<(), pdf_chapter_splitter::Error>(())
//! ```

pub mod chapters;
pub mod error;
pub mod pdf;
pub mod sanitize;
pub mod server;
pub mod split;

// Re-export commonly used items
pub use error::{Error, Result};
pub use split::{SplitMode, SplitOptions, SplitReport, Splitter};
