//! End-to-end tests over the assembled router: upload and static-serve flows
//! against a throwaway storage root.

use crate::{Application, Config};
use axum::http::StatusCode;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use tempfile::TempDir;

/// Build a test server over a fresh temporary storage root.
async fn test_app(max_upload_size: u64) -> (TestServer, TempDir) {
    let storage = tempfile::tempdir().expect("Failed to create temp dir");

    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        storage_dir: storage.path().to_path_buf(),
        max_upload_size,
    };

    let app = Application::new(config).await.expect("Failed to create application");

    (app.into_test_server(), storage)
}

fn file_form(name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content.to_vec()).file_name(name))
}

#[test_log::test(tokio::test)]
async fn upload_to_directory_subpath_then_get_round_trips() {
    let (server, storage) = test_app(1024 * 1024).await;

    let response = server
        .post("/api/filehandler/docs/")
        .multipart(file_form("report.pdf", b"ABC"))
        .await;

    response.assert_status_ok();
    response.assert_text("File report.pdf uploaded successfully");

    let stored = std::fs::read(storage.path().join("docs/report.pdf")).expect("file should exist");
    assert_eq!(stored, b"ABC");

    let response = server.get("/docs/report.pdf").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "ABC");
}

#[test_log::test(tokio::test)]
async fn upload_to_explicit_subpath_ignores_original_filename_for_storage() {
    let (server, storage) = test_app(1024 * 1024).await;

    let response = server
        .post("/api/filehandler/notes/today.txt")
        .multipart(file_form("draft.txt", b"hello"))
        .await;

    response.assert_status_ok();
    // The confirmation names the originally uploaded file, not the destination.
    response.assert_text("File draft.txt uploaded successfully");

    let stored = std::fs::read(storage.path().join("notes/today.txt")).expect("file should exist");
    assert_eq!(stored, b"hello");
    assert!(!storage.path().join("notes/draft.txt").exists());
}

#[test_log::test(tokio::test)]
async fn upload_to_empty_subpath_stores_under_original_filename() {
    let (server, storage) = test_app(1024 * 1024).await;

    let response = server
        .post("/api/filehandler/")
        .multipart(file_form("hello.txt", b"hi"))
        .await;

    response.assert_status_ok();
    response.assert_text("File hello.txt uploaded successfully");

    let stored = std::fs::read(storage.path().join("hello.txt")).expect("file should exist");
    assert_eq!(stored, b"hi");
}

#[test_log::test(tokio::test)]
async fn upload_overwrites_existing_file() {
    let (server, storage) = test_app(1024 * 1024).await;

    server
        .post("/api/filehandler/a.txt")
        .multipart(file_form("a.txt", b"first"))
        .await
        .assert_status_ok();

    server
        .post("/api/filehandler/a.txt")
        .multipart(file_form("a.txt", b"second"))
        .await
        .assert_status_ok();

    let stored = std::fs::read(storage.path().join("a.txt")).expect("file should exist");
    assert_eq!(stored, b"second");
}

#[test_log::test(tokio::test)]
async fn get_for_missing_file_returns_404_with_empty_body() {
    let (server, _storage) = test_app(1024 * 1024).await;

    let response = server.get("/no/such/file.txt").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.as_bytes().is_empty());
}

#[test_log::test(tokio::test)]
async fn oversized_upload_is_rejected_without_persisting_anything() {
    let (server, storage) = test_app(16).await;

    let response = server
        .post("/api/filehandler/big.bin")
        .multipart(file_form("big.bin", &[0u8; 64]))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let entries: Vec<_> = std::fs::read_dir(storage.path())
        .expect("storage root should exist")
        .collect();
    assert!(entries.is_empty(), "no file should be created for a rejected upload");
}

#[test_log::test(tokio::test)]
async fn non_post_to_upload_prefix_returns_405() {
    let (server, _storage) = test_app(1024 * 1024).await;

    let response = server.get("/api/filehandler/some/file.txt").await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}

#[test_log::test(tokio::test)]
async fn upload_without_file_field_is_rejected() {
    let (server, storage) = test_app(1024 * 1024).await;

    let form = MultipartForm::new().add_part("other", Part::bytes(b"data".to_vec()).file_name("x.txt"));
    let response = server.post("/api/filehandler/x.txt").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!storage.path().join("x.txt").exists());
}

#[test_log::test(tokio::test)]
async fn upload_escaping_storage_root_is_rejected() {
    let (server, storage) = test_app(1024 * 1024).await;

    let response = server
        .post("/api/filehandler/..%2Fescape.txt")
        .multipart(file_form("escape.txt", b"nope"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let outside = storage.path().parent().expect("temp dir has a parent").join("escape.txt");
    assert!(!outside.exists(), "file must not be written outside the storage root");
}

#[test_log::test(tokio::test)]
async fn upload_to_directory_subpath_without_filename_is_rejected() {
    let (server, _storage) = test_app(1024 * 1024).await;

    let form = MultipartForm::new().add_part("file", Part::bytes(b"data".to_vec()));
    let response = server.post("/api/filehandler/docs/").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}
