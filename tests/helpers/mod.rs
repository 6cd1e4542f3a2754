//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use userdrive_auth::JwtEncoder;
use userdrive_core::config::{AppConfig, StorageConfig};
use userdrive_core::types::UserId;

const TEST_SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "userdrive-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Owns every directory the app writes to
    pub dir: TempDir,
}

/// Response returned by the test helpers
pub struct TestResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body bytes
    pub bytes: Vec<u8>,
    /// Body parsed as JSON (`Null` when it is not JSON)
    pub body: Value,
}

/// A file part for [`TestApp::upload`]
pub struct UploadPart<'a> {
    pub file_name: &'a str,
    pub content: &'a [u8],
}

impl TestApp {
    /// Create a new test application on a fresh data directory
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting its config
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.storage = StorageConfig::rooted_at(dir.path());
        config.auth.jwt_secret = TEST_SECRET.to_string();
        adjust(&mut config);

        let state = userdrive_api::build_state(config.clone())
            .await
            .expect("Failed to build app state");
        let router = userdrive_api::build_app(state);

        Self {
            router,
            config,
            dir,
        }
    }

    /// Issue a valid token for `user`
    pub fn token(&self, user: &str, is_admin: bool) -> String {
        let encoder = JwtEncoder::new(&self.config.auth);
        let user_id = UserId::parse(user).expect("valid user id");
        encoder
            .issue(&user_id, user, is_admin)
            .expect("Failed to issue token")
            .0
    }

    /// Absolute location of a path inside `user`'s tree
    pub fn user_path(&self, user: &str, relative: &str) -> std::path::PathBuf {
        let root = std::path::Path::new(&self.config.storage.root_dir).join(user);
        if relative.is_empty() {
            root
        } else {
            root.join(relative)
        }
    }

    /// Write a file straight into `user`'s tree
    pub fn seed_file(&self, user: &str, relative: &str, content: &[u8]) {
        let path = self.user_path(user, relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent");
        }
        std::fs::write(path, content).expect("Failed to seed file");
    }

    /// Make a JSON request with an optional bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&json).expect("Failed to encode body"))
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).expect("Failed to build request"))
            .await
    }

    /// Make a bodiless request authenticated by cookie
    pub async fn request_with_cookie(&self, method: &str, path: &str, token: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(
                header::COOKIE,
                format!("theme=dark; {}={token}", self.config.auth.cookie_name),
            )
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    /// POST a multipart upload
    pub async fn upload(
        &self,
        fields: &[(&str, &str)],
        file: Option<UploadPart<'_>>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(part) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    part.file_name
                )
                .as_bytes(),
            );
            body.extend_from_slice(part.content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }

        self.send(builder.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Names of the entries in a list response, in order
pub fn entry_names(body: &Value) -> Vec<String> {
    body["data"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
