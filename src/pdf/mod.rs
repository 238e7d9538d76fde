//! PDF manipulation module

pub mod extract;
pub mod metadata;
pub mod text;

// Re-export commonly used items
pub use extract::{extract_page_range, write_document};
pub use metadata::{count_pages, document_metadata, extract_metadata, PdfMetadata};
pub use text::{extract_all_pages, extract_page_text};
