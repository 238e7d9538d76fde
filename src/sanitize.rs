//! File name sanitizing for chapter outputs and uploads

use std::path::{Path, PathBuf};

/// Used when a chapter title sanitizes down to nothing
pub const UNTITLED_CHAPTER: &str = "未命名章节";

/// Used when an upload name sanitizes down to nothing
pub const FALLBACK_UPLOAD_NAME: &str = "upload.pdf";

const MAX_TITLE_CHARS: usize = 200;

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Turn a chapter title into a file name stem that is valid on Windows and Unix
pub fn sanitize_filename(title: &str) -> String {
    let replaced: String = title
        .chars()
        .filter(|&c| !matches!(c, '\u{00}'..='\u{1F}' | '\u{7F}'..='\u{9F}'))
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect();

    let mut name = replaced.trim_matches(|c| c == '.' || c == ' ').to_string();

    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(&name)) {
        name = format!("_{name}");
    }

    if name.chars().count() > MAX_TITLE_CHARS {
        name = name.chars().take(MAX_TITLE_CHARS).collect();
    }

    if name.is_empty() {
        UNTITLED_CHAPTER.to_string()
    } else {
        name
    }
}

/// Make a client-supplied upload name safe to store
///
/// Only the last path component survives; whitespace becomes `_` and
/// anything that is not alphanumeric or `._-` is dropped.
pub fn secure_upload_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '_']);

    if cleaned.is_empty() {
        FALLBACK_UPLOAD_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Whether a name ends in `.pdf`, ignoring case
pub fn has_pdf_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Return `path`, or `stem_1.ext`, `stem_2.ext`, ... if it already exists
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1;
    loop {
        let candidate = parent.join(format!("{stem}_{counter}{extension}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
