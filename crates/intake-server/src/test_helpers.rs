use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use intake_service::{ServiceConfig, SubmissionService};
use intake_store::StoreConfig;
use tokio::net::TcpListener;
use url::Url;

use crate::auth::{self, AuthConfig};
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::routes::{build_router, AppState, InnerAppState};

fn test_state(upload_dir: PathBuf, public_url: &str, auth: Option<Arc<AuthConfig>>) -> AppState {
    let db = Arc::new(intake_db::SqliteDatabase::open_in_memory().unwrap());
    let store = intake_store::create_store(&StoreConfig { upload_dir });
    let config = ServiceConfig::new(Url::parse(public_url).unwrap()).unwrap();
    Arc::new(InnerAppState {
        service: SubmissionService::new(db, store, config),
        auth,
        max_body_bytes: DEFAULT_MAX_UPLOAD_BYTES,
    })
}

/// A fresh `uploads` directory inside a temp dir that outlives the test.
fn temp_upload_dir() -> PathBuf {
    let dir = tempfile::tempdir().unwrap().keep().join("uploads");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Build a test router with in-memory SQLite, a temp upload dir, and no admin key.
pub async fn test_router() -> Router {
    test_router_with_store().await.0
}

/// Like `test_router`, also returning the upload directory.
pub async fn test_router_with_store() -> (Router, PathBuf) {
    let dir = temp_upload_dir();
    let state = test_state(dir.clone(), "http://localhost:3720/uploads/", None);
    (build_router(state), dir)
}

/// Build a test router with an admin key, returning (router, admin_key).
pub async fn test_router_with_auth() -> (Router, String) {
    let admin_key = auth::generate_api_key();
    let state = test_state(
        temp_upload_dir(),
        "http://localhost:3720/uploads/",
        auth::build_auth_config(Some(&admin_key)),
    );
    (build_router(state), admin_key)
}

/// A running test server.
pub struct TestServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    pub admin_key: String,
    pub upload_dir: PathBuf,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn an axum test server on a random port with an admin key and its
/// own `/uploads/` route as the public upload URL.
pub async fn spawn_test_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let admin_key = auth::generate_api_key();
    let upload_dir = temp_upload_dir();
    let state = test_state(
        upload_dir.clone(),
        &format!("{base_url}/uploads/"),
        auth::build_auth_config(Some(&admin_key)),
    );
    let app = build_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        base_url,
        admin_key,
        upload_dir,
        _handle: handle,
    }
}

#[cfg(test)]
pub const MULTIPART_BOUNDARY: &str = "intake-test-boundary";

/// Encode text fields and an optional `file` part as multipart/form-data.
#[cfg(test)]
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

#[cfg(test)]
pub async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Post a complete submission named `name` through the router.
#[cfg(test)]
pub async fn seed_submission(app: &Router, name: &str) {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    let fields = [
        ("name", name),
        ("email", "kari@example.no"),
        ("phone", "12345678"),
        ("plateThickness", "4 mm"),
        ("submit_form", "Send"),
    ];
    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(multipart_body(&fields, None)))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
