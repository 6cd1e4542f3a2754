//! Integration tests for multipart uploads.

mod helpers;

use axum::http::StatusCode;

use helpers::{TestApp, UploadPart};

#[tokio::test]
async fn test_upload_stores_file() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[("parentPath", "docs")],
            Some(UploadPart {
                file_name: "notes.txt",
                content: b"hello world",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["filename"], "notes.txt");
    assert_eq!(data["path"], "docs/notes.txt");
    assert_eq!(data["parentPath"], "docs");
    assert_eq!(data["entry"]["size"], 11);
    assert_eq!(
        std::fs::read(app.user_path("alice", "docs/notes.txt")).expect("stored file"),
        b"hello world"
    );
}

#[tokio::test]
async fn test_upload_collisions_get_numbered() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let mut paths = Vec::new();
    for content in [&b"one"[..], &b"two"[..], &b"three"[..]] {
        let response = app
            .upload(
                &[("parentId", "pics")],
                Some(UploadPart {
                    file_name: "photo.png",
                    content,
                }),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        paths.push(response.body["data"]["path"].as_str().unwrap_or_default().to_string());
    }

    assert_eq!(
        paths,
        vec!["pics/photo.png", "pics/photo (1).png", "pics/photo (2).png"]
    );
    assert_eq!(
        std::fs::read(app.user_path("alice", "pics/photo.png")).expect("first upload"),
        b"one"
    );
}

#[tokio::test]
async fn test_upload_leaves_no_staging_files() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[],
            Some(UploadPart {
                file_name: "a.bin",
                content: &[0u8; 512],
            }),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let staged = std::fs::read_dir(&app.config.storage.temp_dir)
        .expect("temp dir")
        .count();
    assert_eq!(staged, 0);
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = TestApp::with_config(|c| c.storage.max_upload_size_bytes = 8).await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[],
            Some(UploadPart {
                file_name: "big.bin",
                content: b"0123456789",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!app.user_path("alice", "big.bin").exists());
    let staged = std::fs::read_dir(&app.config.storage.temp_dir)
        .expect("temp dir")
        .count();
    assert_eq!(staged, 0);
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(&[("parentPath", "docs")], None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_traversal_rejected() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[("parentPath", "../bob")],
            Some(UploadPart {
                file_name: "x.txt",
                content: b"x",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid path");
    assert!(!app.user_path("bob", "x.txt").exists());
}

#[tokio::test]
async fn test_upload_into_other_tree_forbidden() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[("userId", "bob")],
            Some(UploadPart {
                file_name: "x.txt",
                content: b"x",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let staged = std::fs::read_dir(&app.config.storage.temp_dir)
        .expect("temp dir")
        .count();
    assert_eq!(staged, 0);
}

#[tokio::test]
async fn test_upload_unauthenticated() {
    let app = TestApp::new().await;

    let response = app
        .upload(
            &[],
            Some(UploadPart {
                file_name: "x.txt",
                content: b"x",
            }),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_keeps_declared_name() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[],
            Some(UploadPart {
                file_name: "  notes.txt",
                content: b"n",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["filename"], "  notes.txt");
    assert!(app.user_path("alice", "  notes.txt").is_file());
    assert!(!app.user_path("alice", "notes.txt").exists());
}

#[tokio::test]
async fn test_upload_blank_name_rejected() {
    let app = TestApp::new().await;
    let token = app.token("alice", false);

    let response = app
        .upload(
            &[],
            Some(UploadPart {
                file_name: "   ",
                content: b"n",
            }),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
