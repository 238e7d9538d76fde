//! HTTP routes: upload, downloads and preview.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, warn};

use crate::chapters::{parse_pattern_list, ChapterPatterns};
use crate::sanitize::has_pdf_extension;
use crate::split::{SplitOptions, Splitter};
use super::archive::{archive_name, zip_outputs};
use super::config::ServerConfig;
use super::error::ApiError;
use super::tasks::{ChapterPreview, TaskStore};

/// The upload page
const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Room for multipart boundaries and the pattern field on top of the file
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: TaskStore,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = TaskStore::new(&config.upload_dir, &config.output_dir);
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub task_id: String,
    pub original_filename: String,
    pub output_files: Vec<String>,
    pub total_files: usize,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub task_id: String,
    pub chapters: Vec<ChapterPreview>,
    pub total: usize,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download/:task_id", get(download_all))
        .route("/download/:task_id/*filename", get(download_single))
        .route("/preview/:task_id", get(preview))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// A file field pulled out of the multipart body
struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_mb: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { max_mb }
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

/// `POST /upload`: store the file, split it, and list the results
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let max_mb = state.config.max_upload_mb();

    let mut file: Option<UploadedFile> = None;
    let mut custom_patterns = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_mb))?;
                file = Some(UploadedFile {
                    name: file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "custom_patterns" => {
                custom_patterns = field.text().await.map_err(|e| multipart_error(e, max_mb))?;
            }
            _ => {}
        }
    }

    let file = match file {
        Some(f) if !f.name.is_empty() => f,
        _ => return Err(ApiError::BadRequest("No file selected".into())),
    };

    if !has_pdf_extension(&file.name) {
        return Err(ApiError::BadRequest("Only PDF files are supported".into()));
    }
    if file.bytes.len() > state.config.max_upload_bytes {
        return Err(ApiError::PayloadTooLarge { max_mb });
    }

    let task_id = TaskStore::new_task_id();
    let (upload_path, original_filename) = state.store.upload_path(&task_id, &file.name);
    let output_dir = state.store.task_dir(&task_id)?;

    tokio::fs::create_dir_all(&state.config.upload_dir).await?;
    tokio::fs::write(&upload_path, &file.bytes).await?;

    info!(%task_id, file = %original_filename, bytes = file.bytes.len(), "upload stored");

    let mut patterns = ChapterPatterns::new();
    for pattern in parse_pattern_list(&custom_patterns) {
        if let Err(e) = patterns.add_custom(&pattern) {
            warn!(%task_id, pattern = %pattern, error = %e, "ignoring invalid pattern");
        }
    }

    let options = SplitOptions {
        output_dir: Some(output_dir),
        pages_per_section: state.config.pages_per_section,
        patterns,
    };

    let report = run_split(upload_path, options).await?;
    if !report.is_complete() {
        warn!(%task_id, failures = ?report.failures, "split incomplete");
        return Err(ApiError::ProcessingFailed);
    }

    let output_files = state.store.list_outputs(&task_id)?;
    info!(%task_id, files = output_files.len(), "task finished");

    Ok(Json(UploadResponse {
        success: true,
        task_id,
        original_filename,
        total_files: output_files.len(),
        output_files,
    }))
}

/// Splitting is CPU-bound and uses blocking file IO
async fn run_split(path: PathBuf, options: SplitOptions) -> Result<crate::split::SplitReport, ApiError> {
    tokio::task::spawn_blocking(move || {
        let splitter = Splitter::new(path, options)?;
        splitter.split_by_chapters()
    })
    .await
    .map_err(|e| ApiError::Internal(format!("split task failed: {e}")))?
    .map_err(ApiError::from)
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn attachment(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();

    let encoded = urlencoding::encode(filename);

    let value = format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}");
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn file_response(bytes: Vec<u8>, content_type: &'static str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, attachment(filename)),
        ],
        bytes,
    )
        .into_response()
}

/// `GET /download/:task_id`: every chapter as one ZIP
async fn download_all(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response, ApiError> {
    let dir = state.store.task_dir(&task_id)?;
    if !dir.is_dir() {
        return Err(ApiError::NotFound("Files not found".into()));
    }

    let bytes = tokio::task::spawn_blocking(move || zip_outputs(&dir))
        .await
        .map_err(|e| ApiError::Internal(format!("zip task failed: {e}")))??;

    info!(%task_id, bytes = bytes.len(), "serving archive");
    Ok(file_response(bytes, "application/zip", &archive_name(&task_id)))
}

/// `GET /download/:task_id/*filename`: one chapter file
async fn download_single(
    State(state): State<AppState>,
    Path((task_id, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = state.store.resolve_file(&task_id, &filename)?;
    let bytes = tokio::fs::read(&path).await?;

    let served_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(filename);

    info!(%task_id, file = %served_name, "serving chapter");
    Ok(file_response(bytes, "application/pdf", &served_name))
}

/// `GET /preview/:task_id`: file names and sizes
async fn preview(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let chapters = state.store.preview(&task_id)?;
    Ok(Json(PreviewResponse {
        task_id,
        total: chapters.len(),
        chapters,
    }))
}
