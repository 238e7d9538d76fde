//! Error types for the PDF chapter splitter library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the PDF chapter splitter library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path exists but is a directory or something else
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Zero-byte input
    #[error("File is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    /// Invalid PDF (no pages)
    #[error("PDF has no pages: {}", .0.display())]
    EmptyPdf(PathBuf),

    /// Chapter pattern failed to compile
    #[error("Invalid chapter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Chapter pattern was blank
    #[error("Chapter pattern is empty")]
    EmptyPattern,

    /// Page range outside the document (0-based, inclusive)
    #[error("Invalid page range {start}-{end} for a document with {total} pages")]
    InvalidPageRange {
        start: usize,
        end: usize,
        total: usize,
    },

    /// Section size for even splitting must be positive
    #[error("Pages per section must be greater than zero")]
    InvalidSectionSize,

    /// ZIP archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// General error
    #[error("{0}")]
    General(String),
}
