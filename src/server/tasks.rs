//! On-disk task layout
//!
//! Each upload becomes a task identified by a UUID. The raw upload lives in
//! `upload_dir/{task_id}_{name}` and the split results in
//! `output_dir/{task_id}/`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::sanitize::{has_pdf_extension, secure_upload_name};
use super::error::ApiError;

/// One row of the preview listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterPreview {
    pub filename: String,
    /// Size formatted as `"12.3 KB"`
    pub size: String,
}

/// Resolves task paths and lists task outputs
#[derive(Debug, Clone)]
pub struct TaskStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

/// Human-readable size in kilobytes with one decimal
pub fn format_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

impl TaskStore {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn new_task_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Where to store an upload for `task_id`, plus the sanitized original name
    pub fn upload_path(&self, task_id: &str, original_name: &str) -> (PathBuf, String) {
        let safe_name = secure_upload_name(original_name);
        let path = self.upload_dir.join(format!("{task_id}_{safe_name}"));
        (path, safe_name)
    }

    /// Output directory for a task id taken from a URL
    ///
    /// Anything that is not a UUID is rejected, so client input can never
    /// walk out of the output directory.
    pub fn task_dir(&self, task_id: &str) -> Result<PathBuf, ApiError> {
        Uuid::parse_str(task_id).map_err(|_| ApiError::NotFound("Files not found".into()))?;
        Ok(self.output_dir.join(task_id))
    }

    /// Output directory for a task that must already exist on disk
    fn existing_task_dir(&self, task_id: &str) -> Result<PathBuf, ApiError> {
        let dir = self.task_dir(task_id)?;
        if !dir.is_dir() {
            return Err(ApiError::NotFound("Files not found".into()));
        }
        Ok(dir)
    }

    /// Sorted `.pdf` file names in a task's output directory
    pub fn list_outputs(&self, task_id: &str) -> Result<Vec<String>, ApiError> {
        let dir = self.existing_task_dir(task_id)?;
        Ok(list_pdf_files(&dir)?)
    }

    /// Name and size of every output file
    pub fn preview(&self, task_id: &str) -> Result<Vec<ChapterPreview>, ApiError> {
        let dir = self.existing_task_dir(task_id)?;

        list_pdf_files(&dir)?
            .into_iter()
            .map(|filename| -> Result<ChapterPreview, ApiError> {
                let size = std::fs::metadata(dir.join(&filename))?.len();
                Ok(ChapterPreview {
                    filename,
                    size: format_kb(size),
                })
            })
            .collect()
    }

    /// Find the file a download link refers to
    ///
    /// Exact names win. Otherwise the first PDF whose name contains the
    /// requested one, ignoring spaces, is used: some clients mangle spaces in
    /// links to CJK file names.
    pub fn resolve_file(&self, task_id: &str, requested: &str) -> Result<PathBuf, ApiError> {
        if requested.contains("..") || requested.contains('/') || requested.contains('\\') {
            return Err(ApiError::BadRequest("Invalid file name".into()));
        }

        let not_found = || ApiError::NotFound(format!("File not found: {requested}"));

        let dir = self.task_dir(task_id)?;
        if !dir.is_dir() {
            return Err(not_found());
        }

        let files = list_pdf_files(&dir)?;
        debug!(task_id, requested, ?files, "resolving download");

        if files.iter().any(|f| f == requested) {
            return Ok(dir.join(requested));
        }

        let wanted: String = requested.chars().filter(|&c| c != ' ').collect();
        if wanted.is_empty() {
            return Err(not_found());
        }

        files
            .iter()
            .find(|f| f.chars().filter(|&c| c != ' ').collect::<String>().contains(&wanted))
            .map(|f| {
                debug!(requested, found = %f, "using similar file name");
                dir.join(f)
            })
            .ok_or_else(not_found)
    }
}

/// Sorted names of the regular `.pdf` files in `dir`
pub fn list_pdf_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| has_pdf_extension(name))
        .collect();

    files.sort();
    Ok(files)
}
