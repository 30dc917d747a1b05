use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::HOST;
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde_json::{json, Value};
use servermock_core::config::settings::Settings;
use servermock_core::InterceptionEngine;
use servermock_http::MockServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

struct Running {
    addr: SocketAddr,
    engine: Arc<InterceptionEngine>,
    _shutdown: oneshot::Sender<()>,
}

async fn start(settings: Settings) -> Running {
    let engine = Arc::new(InterceptionEngine::new());
    let bound = MockServer::new(Arc::clone(&engine), &settings)
        .bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind");
    let addr = bound.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(bound.serve_with_shutdown(async {
        let _ = rx.await;
    }));
    Running {
        addr,
        engine,
        _shutdown: tx,
    }
}

fn client() -> Client<HttpConnector, Full<Bytes>> {
    Client::builder(TokioExecutor::new()).build_http()
}

async fn send(request: Request<Full<Bytes>>) -> (StatusCode, Bytes) {
    let response = client().request(request).await.expect("send request");
    let status = response.status();
    let body = response.into_body().collect().await.expect("read body").to_bytes();
    (status, body)
}

async fn register(addr: SocketAddr, spec: Value) -> (StatusCode, Bytes) {
    send(
        Request::post(format!("http://{addr}/__cypress_server_mock"))
            .body(Full::new(Bytes::from(spec.to_string())))
            .unwrap(),
    )
    .await
}

async fn clear(addr: SocketAddr) -> (StatusCode, Bytes) {
    send(
        Request::post(format!("http://{addr}/__cypress_clear_mocks"))
            .body(Full::new(Bytes::new()))
            .unwrap(),
    )
    .await
}

async fn get_users(addr: SocketAddr) -> (StatusCode, Bytes) {
    send(
        Request::get(format!("http://{addr}/users"))
            .header(HOST, "api.test")
            .header("x-forwarded-proto", "https")
            .body(Full::new(Bytes::new()))
            .unwrap(),
    )
    .await
}

fn users_spec() -> Value {
    json!({
        "hostname": "https://api.test",
        "method": "GET",
        "path": "/users",
        "statusCode": 200,
        "body": {"ok": true}
    })
}

#[tokio::test]
async fn registered_mock_is_served_once() {
    let server = start(Settings::default()).await;

    let (status, body) = register(server.addr, users_spec()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let (status, body) = get_users(server.addr).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Bytes::from_static(br#"{"ok":true}"#));

    let (status, _) = get_users(server.addr).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn persisted_mock_is_served_until_cleared() {
    let server = start(Settings::default()).await;

    let mut spec = users_spec();
    spec["persist"] = json!(true);
    register(server.addr, spec).await;

    for _ in 0..2 {
        let (status, body) = get_users(server.addr).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Bytes::from_static(br#"{"ok":true}"#));
    }

    let (status, body) = clear(server.addr).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(server.engine.active_mock_count(), 0);

    let (status, _) = get_users(server.addr).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_without_mocks_succeeds() {
    let server = start(Settings::default()).await;
    let (status, _) = clear(server.addr).await;
    assert_eq!(status, StatusCode::OK);
    assert!(server.engine.is_active());
}

#[tokio::test]
async fn truncated_registration_is_rejected() {
    let server = start(Settings::default()).await;

    let (status, body) = send(
        Request::post(format!("http://{}/__cypress_server_mock", server.addr))
            .body(Full::new(Bytes::from_static(br#"{"hostname": "https://api.te"#)))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: Value = serde_json::from_slice(&body).expect("JSON error body");
    assert!(error["error"].as_str().unwrap().contains("invalid mock definition"));
    assert_eq!(server.engine.active_mock_count(), 0);
}

#[tokio::test]
async fn unmocked_proxy_request_passes_through() {
    let upstream = start(Settings::default()).await;
    upstream
        .engine
        .scope(&format!("http://{}", upstream.addr))
        .unwrap()
        .persist()
        .get("/hello")
        .unwrap()
        .reply(200, json!("from upstream"))
        .unwrap();

    let proxy = start(Settings::default()).await;

    let mut stream = TcpStream::connect(proxy.addr).await.expect("connect proxy");
    let request = format!(
        "GET http://{addr}/hello HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n",
        addr = upstream.addr
    );
    stream.write_all(request.as_bytes()).await.expect("write");

    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read");

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("from upstream"), "{response}");
}

#[tokio::test]
async fn unmocked_proxy_request_fails_without_passthrough() {
    let mut settings = Settings::default();
    settings.server.passthrough = false;
    let proxy = start(settings).await;

    let mut stream = TcpStream::connect(proxy.addr).await.expect("connect proxy");
    stream
        .write_all(b"GET http://unmocked.test/ HTTP/1.1\r\nHost: unmocked.test\r\nConnection: close\r\n\r\n")
        .await
        .expect("write");

    let mut response = String::new();
    stream.read_to_string(&mut response).await.expect("read");
    assert!(response.starts_with("HTTP/1.1 502"), "{response}");
}
