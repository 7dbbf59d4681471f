use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use httpadapter::service::fs::{EntryBody, ListingBody};
use httpadapter::{AppState, create_router};
use serde_json::{Value, json};
use storage::Engine;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tonic::transport::Endpoint;
use tower::ServiceExt;

const BOUNDARY: &str = "ns-test-boundary";

async fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    tokio::fs::create_dir(root.join("dir1")).await.unwrap();
    tokio::fs::create_dir(root.join("dir2")).await.unwrap();
    tokio::fs::write(root.join("file1.txt"), b"file one").await.unwrap();
    tokio::fs::write(root.join("file2.txt"), b"file two").await.unwrap();
    tokio::fs::write(root.join("dir1/file3.txt"), b"file three")
        .await
        .unwrap();
    dir
}

/// Gateway router backed by a real engine on an ephemeral port.
async fn gateway(dir: &TempDir) -> Router {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let engine = Arc::new(Engine::new(dir.path()).with_chunk_size(1024));
    tokio::spawn(storage::serve_with_listener(
        listener,
        engine,
        std::future::pending(),
    ));
    let endpoint = Endpoint::from_shared(format!("http://{addr}")).unwrap();
    create_router(Arc::new(AppState::connect_lazy(&endpoint)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(uri: &str, field: &str, data: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_mkdir_then_conflict() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send(&app, post_json("/mkdir/", json!({ "path": "/dir3" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert!(dir.path().join("dir3").is_dir());

    let (status, body) = send_json(&app, post_json("/mkdir/", json!({ "path": "/dir3" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "msg": "file or directory /dir3 already exists" }));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let request = Request::builder()
        .method("POST")
        .uri("/mkdir/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "can't parse json" }));

    let (status, body) = send_json(&app, post_json("/readdir/", json!({ "dir": "/" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "can't parse json");
}

#[tokio::test]
async fn test_readdir_root() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send(&app, post_json("/readdir/", json!({ "path": "/" }))).await;
    assert_eq!(status, StatusCode::OK);
    let mut listing: ListingBody = serde_json::from_slice(&body).unwrap();
    listing.dirs.sort_by(|a, b| a.name.cmp(&b.name));
    listing.files.sort_by(|a, b| a.name.cmp(&b.name));

    let entry = |name: &str| EntryBody {
        name: name.to_string(),
        path: format!("/{name}"),
    };
    assert_eq!(listing.dirs, vec![entry("dir1"), entry("dir2")]);
    assert_eq!(listing.files, vec![entry("file1.txt"), entry("file2.txt")]);
}

#[tokio::test]
async fn test_readdir_missing_is_not_found() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send_json(&app, post_json("/readdir/", json!({ "path": "/nope" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "file or directory /nope not found" }));
}

#[tokio::test]
async fn test_remove_and_remove_all() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, _) = send_json(&app, post_json("/remove/", json!({ "path": "/dir1" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(dir.path().join("dir1/file3.txt").is_file());

    let (status, _) = send(&app, post_json("/remove/", json!({ "path": "/file1.txt" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.path().join("file1.txt").exists());

    let (status, _) = send(&app, post_json("/removeall/", json!({ "path": "/dir1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!dir.path().join("dir1").exists());

    let (status, _) = send_json(&app, post_json("/removeall/", json!({ "path": "/dir1" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_then_download() {
    let dir = fixture().await;
    let app = gateway(&dir).await;
    let data: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();

    let (status, body) = send(&app, multipart("/upload/?path=/dir2/blob.bin", "file", &data)).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
    assert_eq!(tokio::fs::read(dir.path().join("dir2/blob.bin")).await.unwrap(), data);

    let response = app
        .clone()
        .oneshot(get("/download/?path=/dir2/blob.bin"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=blob.bin"
    );
    assert_eq!(headers[header::CONTENT_LENGTH], "100000");
    assert_eq!(headers["Accept-Length"], "100000");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(body.to_vec(), data);
}

#[tokio::test]
async fn test_upload_larger_than_rpc_message_limit() {
    let dir = fixture().await;
    let app = gateway(&dir).await;
    // well past the 4 MiB default decode limit of a single gRPC message
    let data: Vec<u8> = (0..6 * 1024 * 1024u32).map(|i| (i % 241) as u8).collect();

    let (status, body) = send(&app, multipart("/upload/?path=/big.bin", "file", &data)).await;
    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
    assert_eq!(tokio::fs::read(dir.path().join("big.bin")).await.unwrap(), data);

    let (status, body) = send(&app, get("/download/?path=/big.bin")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, data);
}

#[tokio::test]
async fn test_upload_existing_is_conflict() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send_json(&app, multipart("/upload/?path=/file2.txt", "file", b"new")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "msg": "file or directory /file2.txt already exists" }));
    assert_eq!(
        tokio::fs::read(dir.path().join("file2.txt")).await.unwrap(),
        b"file two"
    );
}

#[tokio::test]
async fn test_upload_rejections() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send_json(&app, multipart("/upload/", "file", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "path missing" }));

    let (status, body) = send_json(&app, multipart("/upload/?path=/x.txt", "other", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "can't parse form" }));
    assert!(!dir.path().join("x.txt").exists());

    let (status, body) = send_json(&app, post_json("/upload/?path=/x.txt", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "can't parse form" }));

    let (status, _) = send_json(&app, multipart("/upload/?path=/../x.txt", "file", b"x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejections() {
    let dir = fixture().await;
    let app = gateway(&dir).await;

    let (status, body) = send_json(&app, get("/download/?path=/ghost.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "file or directory /ghost.txt not found" }));

    let (status, body) = send_json(&app, get("/download/")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "msg": "path missing" }));
}

#[tokio::test]
async fn test_unreachable_engine_is_internal_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoint = Endpoint::from_shared(format!("http://{addr}")).unwrap();
    let app = create_router(Arc::new(AppState::connect_lazy(&endpoint)));

    let (status, body) = send_json(&app, post_json("/mkdir/", json!({ "path": "/a" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["msg"].is_string());
}
