//! HTTP tests against the router, without binding a socket

mod common;

use std::io::Cursor;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use common::{build_pdf, encode_segment, BOOK};
use pdf_chapter_splitter::server::{router, AppState, ServerConfig};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "splitter-test-boundary";

struct TestServer {
    _temp: TempDir,
    state: AppState,
}

impl TestServer {
    fn new() -> Self {
        Self::with_limit(10 * 1024 * 1024)
    }

    fn with_limit(max_upload_bytes: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let config = ServerConfig {
            upload_dir: temp.path().join("uploads"),
            output_dir: temp.path().join("outputs"),
            max_upload_bytes,
            cleanup: false,
            ..ServerConfig::default()
        };
        config.ensure_dirs().unwrap();

        Self {
            _temp: temp,
            state: AppState::new(config),
        }
    }

    fn app(&self) -> Router {
        router(self.state.clone())
    }

    async fn get(&self, uri: &str) -> Response {
        self.app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn upload(&self, parts: &[Part<'_>]) -> Response {
        self.app().oneshot(multipart_request(parts)).await.unwrap()
    }
}

/// One multipart field: name, optional file name, content
struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content: Vec<u8>,
}

fn file_part(filename: &str, content: Vec<u8>) -> Part<'_> {
    Part {
        name: "file",
        filename: Some(filename),
        content,
    }
}

fn text_part<'a>(name: &'a str, value: &str) -> Part<'a> {
    Part {
        name,
        filename: None,
        content: value.as_bytes().to_vec(),
    }
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn book_bytes() -> Vec<u8> {
    let mut doc = build_pdf(BOOK);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn header_str(response: &Response, name: header::HeaderName) -> String {
    response
        .headers()
        .get(name)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_index_page() {
    let server = TestServer::new();
    let response = server.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("id=\"uploadForm\""));
    assert!(html.contains("id=\"chapterList\""));
}

#[tokio::test]
async fn test_upload_preview_and_download() {
    let server = TestServer::new();

    let response = server
        .upload(&[
            file_part("My Book.pdf", book_bytes()),
            text_part("custom_patterns", "^Appendix\n\n"),
        ])
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["original_filename"], "My_Book.pdf");
    assert_eq!(json["total_files"], 3);

    let task_id = json["task_id"].as_str().unwrap().to_string();
    let files: Vec<String> = json["output_files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap().to_string())
        .collect();
    assert!(files[0].starts_with("第01章_"), "{files:?}");

    // Preview lists the same files with sizes
    let response = server.get(&format!("/preview/{task_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["task_id"], task_id.as_str());
    assert_eq!(preview["total"], 3);
    assert_eq!(preview["chapters"][0]["filename"], files[0].as_str());
    assert!(preview["chapters"][0]["size"].as_str().unwrap().ends_with(" KB"));

    // Everything as one archive
    let response = server.get(&format!("/download/{task_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/zip");
    let disposition = header_str(&response, header::CONTENT_DISPOSITION);
    assert!(
        disposition.starts_with(&format!("attachment; filename=\"pdf_chapters_{}.zip\"", &task_id[..8])),
        "{disposition}"
    );
    let archive = zip::ZipArchive::new(Cursor::new(body_bytes(response).await)).unwrap();
    assert_eq!(archive.len(), 3);

    // A single chapter by exact name
    let uri = format!("/download/{task_id}/{}", encode_segment(&files[1]));
    let response = server.get(&uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "application/pdf");
    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_download_with_spaces_removed() {
    let server = TestServer::new();
    let json = body_json(server.upload(&[file_part("book.pdf", book_bytes())]).await).await;
    let task_id = json["task_id"].as_str().unwrap();
    let first = json["output_files"][0].as_str().unwrap();

    // "第01章_Chapter 1 ..." requested without its spaces
    let squashed: String = first.chars().filter(|&c| c != ' ').collect();
    let uri = format!("/download/{task_id}/{}", encode_segment(&squashed));
    let response = server.get(&uri).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_without_file() {
    let server = TestServer::new();

    let response = server.upload(&[text_part("custom_patterns", "^Part")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file selected");

    let response = server.upload(&[file_part("", Vec::new())]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No file selected");
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let server = TestServer::new();

    let response = server
        .upload(&[file_part("notes.txt", b"hello".to_vec())])
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Only PDF files are supported");
}

#[tokio::test]
async fn test_upload_rejects_unreadable_pdf() {
    let server = TestServer::new();

    let response = server
        .upload(&[file_part("broken.pdf", b"definitely not a pdf".to_vec())])
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Could not read PDF"));
}

#[tokio::test]
async fn test_upload_too_large() {
    let server = TestServer::with_limit(100);

    let response = server.upload(&[file_part("book.pdf", book_bytes())]).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("File too large"));
}

#[tokio::test]
async fn test_upload_over_body_limit() {
    // Larger than the limit plus multipart overhead, so the body limit trips
    // while the file field is still streaming
    let server = TestServer::with_limit(100);

    let response = server
        .upload(&[file_part("big.pdf", vec![b'x'; 3 * 1024 * 1024])])
        .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body_json(response).await["error"],
        "File too large, maximum size is 1MB"
    );
}

#[tokio::test]
async fn test_unknown_tasks_are_not_found() {
    let server = TestServer::new();
    let unknown = "0f8fad5b-d9cb-469f-a165-70867728950e";

    for uri in [
        "/download/not-a-uuid".to_string(),
        "/preview/not-a-uuid".to_string(),
        format!("/download/{unknown}"),
        format!("/preview/{unknown}"),
        format!("/download/{unknown}/chapter.pdf"),
    ] {
        let response = server.get(&uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert!(body_json(response).await["error"].is_string());
    }
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let server = TestServer::new();
    let json = body_json(server.upload(&[file_part("book.pdf", book_bytes())]).await).await;
    let task_id = json["task_id"].as_str().unwrap();

    let response = server
        .get(&format!("/download/{task_id}/..%2F..%2Fsecret.pdf"))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = server.get(&format!("/download/{task_id}/missing.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
