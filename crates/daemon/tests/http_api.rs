use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::extract::connect_info::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use common::prelude::PresharedKey;
use landrop_daemon::{http_server, ServiceConfig, ServiceState};

const BOUNDARY: &str = "X-LANDROP-TEST-BOUNDARY";

fn test_config(storage_root: &Path) -> ServiceConfig {
    ServiceConfig {
        listen_port: 5000,
        storage_root: storage_root.to_path_buf(),
        key: PresharedKey::generate(),
        scan_interval: Duration::from_secs(10),
        probe_port: 5000,
        probe_timeout: Duration::from_millis(100),
        probe_concurrency: 254,
        local_addr: Some(Ipv4Addr::new(192, 168, 1, 10)),
        log_level: tracing::Level::INFO,
        log_dir: None,
    }
}

fn test_app() -> (Router, ServiceState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir.path().join("uploads"));
    let state = ServiceState::from_config(&config).unwrap();
    let app = http_server::router(state.clone());
    (app, state, dir)
}

/// Requests normally carry connect info from the TCP accept; tests inject
/// it as an extension so handlers see the chosen requester address.
fn with_addr(mut req: Request<Body>, addr: &str) -> Request<Body> {
    let socket = SocketAddr::from_str(&format!("{addr}:40000")).unwrap();
    req.extensions_mut().insert(ConnectInfo(socket));
    req
}

fn multipart_upload(recipient: Option<&str>, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = String::new();
    if let Some(recipient) = recipient {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"recipient\"\r\n\r\n{recipient}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    ));
    let mut bytes = body.into_bytes();
    bytes.extend_from_slice(content);
    bytes.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(bytes))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_registers_record() {
    let (app, state, _dir) = test_app();

    let req = with_addr(
        multipart_upload(Some("192.168.1.50"), "report.pdf", b"pdf bytes"),
        "192.168.1.10",
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["message"], "File uploaded and encrypted successfully!");
    assert_eq!(body["file"]["original_name"], "report.pdf");

    assert_eq!(state.registry().len(), 1);
    let record = state.registry().list_visible_to("192.168.1.50").remove(0);
    assert_eq!(record.original_name, "report.pdf");
    assert_eq!(record.sender, "192.168.1.10");
    assert!(record.storage_name.starts_with("report.pdf_"));
    assert!(record.storage_name.ends_with(".enc"));
}

#[tokio::test]
async fn test_listing_respects_visibility() {
    let (app, _state, _dir) = test_app();

    let req = with_addr(
        multipart_upload(Some("192.168.1.50"), "report.pdf", b"pdf bytes"),
        "192.168.1.10",
    );
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::OK
    );

    // The named recipient sees the file.
    let req = with_addr(
        Request::get("/get_files").body(Body::empty()).unwrap(),
        "192.168.1.50",
    );
    let body = json_body(app.clone().oneshot(req).await.unwrap()).await;
    let files = body.as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["original_name"], "report.pdf");

    // Anyone else does not.
    let req = with_addr(
        Request::get("/get_files").body(Body::empty()).unwrap(),
        "192.168.1.99",
    );
    let body = json_body(app.oneshot(req).await.unwrap()).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_listing_includes_everyone_files() {
    let (app, _state, _dir) = test_app();

    // No recipient field defaults to Everyone.
    let req = with_addr(
        multipart_upload(None, "notes.txt", b"for all"),
        "192.168.1.10",
    );
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::OK
    );

    let req = with_addr(
        Request::get("/get_files").body(Body::empty()).unwrap(),
        "192.168.1.200",
    );
    let body = json_body(app.oneshot(req).await.unwrap()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_listing_sort_params() {
    let (app, _state, _dir) = test_app();

    for (name, content) in [("big.bin", vec![0u8; 4096]), ("small.bin", vec![0u8; 16])] {
        let req = with_addr(multipart_upload(None, name, &content), "192.168.1.10");
        assert_eq!(
            app.clone().oneshot(req).await.unwrap().status(),
            StatusCode::OK
        );
    }

    let req = with_addr(
        Request::get("/get_files?sort=size&order=desc")
            .body(Body::empty())
            .unwrap(),
        "192.168.1.50",
    );
    let body = json_body(app.clone().oneshot(req).await.unwrap()).await;
    let files = body.as_array().unwrap();
    assert_eq!(files[0]["original_name"], "big.bin");
    assert_eq!(files[1]["original_name"], "small.bin");

    // Garbage params fall back to name ascending.
    let req = with_addr(
        Request::get("/get_files?sort=bogus&order=sideways")
            .body(Body::empty())
            .unwrap(),
        "192.168.1.50",
    );
    let body = json_body(app.oneshot(req).await.unwrap()).await;
    let files = body.as_array().unwrap();
    assert_eq!(files[0]["original_name"], "big.bin");
}

#[tokio::test]
async fn test_upload_without_file_part_rejected() {
    let (app, state, _dir) = test_app();

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"recipient\"\r\n\r\nEveryone\r\n--{BOUNDARY}--\r\n"
    );
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(with_addr(req, "192.168.1.10")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn test_upload_empty_filename_rejected() {
    let (app, state, _dir) = test_app();

    let req = with_addr(multipart_upload(None, "", b"data"), "192.168.1.10");
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.registry().is_empty());
}

#[tokio::test]
async fn test_download_unknown_name_is_404() {
    let (app, _state, _dir) = test_app();

    let req = with_addr(
        Request::get("/download/never-registered.enc")
            .body(Body::empty())
            .unwrap(),
        "192.168.1.50",
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "File not found");
}

#[tokio::test]
async fn test_download_wrong_requester_is_403() {
    let (app, state, _dir) = test_app();

    let req = with_addr(
        multipart_upload(Some("192.168.1.50"), "secret.txt", b"for 50 only"),
        "192.168.1.10",
    );
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::OK
    );
    let storage_name = state
        .registry()
        .list_visible_to("192.168.1.50")
        .remove(0)
        .storage_name;

    let req = with_addr(
        Request::get(format!("/download/{storage_name}"))
            .body(Body::empty())
            .unwrap(),
        "192.168.1.99",
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Access denied");
}

#[tokio::test]
async fn test_download_returns_encrypted_bytes() {
    let (app, state, _dir) = test_app();
    let plaintext = b"round trip through the whole stack";

    let req = with_addr(
        multipart_upload(Some("192.168.1.50"), "blob.bin", plaintext),
        "192.168.1.10",
    );
    assert_eq!(
        app.clone().oneshot(req).await.unwrap().status(),
        StatusCode::OK
    );
    let storage_name = state
        .registry()
        .list_visible_to("192.168.1.50")
        .remove(0)
        .storage_name;

    let req = with_addr(
        Request::get(format!("/download/{storage_name}"))
            .body(Body::empty())
            .unwrap(),
        "192.168.1.50",
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains(&storage_name));

    // The wire carries ciphertext; only the shared key recovers the file.
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_ne!(bytes.as_ref(), plaintext.as_slice());
    assert_eq!(
        state.store().key().decrypt(&bytes).unwrap(),
        plaintext.to_vec()
    );
}

#[tokio::test]
async fn test_get_ips_empty_before_first_scan() {
    let (app, _state, _dir) = test_app();

    let req = with_addr(
        Request::get("/get_ips").body(Body::empty()).unwrap(),
        "192.168.1.50",
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _state, _dir) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::get("/_status/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/_status/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _state, _dir) = test_app();

    let response = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error"], "not found");
}
