//! ZIP bundles for the "download all" link

use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use super::tasks::list_pdf_files;

/// Download name offered for a task's bundle
pub fn archive_name(task_id: &str) -> String {
    let short: String = task_id.chars().take(8).collect();
    format!("pdf_chapters_{short}.zip")
}

/// Build an in-memory, deflated ZIP of every PDF in `dir`
///
/// Entries are flat (no directories) and sorted by name.
pub fn zip_outputs(dir: &Path) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for filename in list_pdf_files(dir)? {
            let bytes = std::fs::read(dir.join(&filename))?;
            zip.start_file(filename, options)?;
            zip.write_all(&bytes)?;
        }

        zip.finish()?;
    }

    Ok(buffer)
}
