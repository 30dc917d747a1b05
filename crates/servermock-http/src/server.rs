//! Mock server: registration middleware followed by the outbound
//! interception stage.

use crate::body::BoxError;
use crate::error::MiddlewareError;
use crate::intercept::OutboundInterceptor;
use crate::middleware::{MockMiddleware, Outcome};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use servermock_core::config::settings::Settings;
use servermock_core::{InterceptionEngine, MockSpec};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

/// Request handler chain sharing one engine.
#[derive(Debug, Clone)]
pub struct MockServer {
    middleware: MockMiddleware,
    outbound: OutboundInterceptor,
}

impl MockServer {
    pub fn new(engine: Arc<InterceptionEngine>, settings: &Settings) -> Self {
        Self {
            middleware: MockMiddleware::new(Arc::clone(&engine), settings.middleware.clone()),
            outbound: OutboundInterceptor::new(engine, settings.server.passthrough)
                .with_body_limits(
                    settings.middleware.max_body_bytes,
                    settings.middleware.body_timeout(),
                ),
        }
    }

    pub fn engine(&self) -> &Arc<InterceptionEngine> {
        self.middleware.engine()
    }

    /// Register seed mocks. Stops at the first invalid one.
    pub fn seed(&self, specs: &[MockSpec]) -> Result<usize, MiddlewareError> {
        for spec in specs {
            self.middleware.register_spec(spec)?;
        }
        Ok(specs.len())
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        match self.middleware.handle(req).await {
            Outcome::Handled(response) => response,
            Outcome::Next(req) => self.outbound.respond(req).await,
        }
    }

    pub async fn bind(self, addr: SocketAddr) -> std::io::Result<BoundServer> {
        let listener = TcpListener::bind(addr).await?;
        Ok(BoundServer {
            listener,
            server: Arc::new(self),
        })
    }
}

/// Server with a bound listener, ready to accept connections.
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    server: Arc<MockServer>,
}

impl BoundServer {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` resolves. In-flight connections
    /// finish on their own tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down mock server");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(connection) => connection,
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let server = Arc::clone(&self.server);
                    tokio::spawn(async move {
                        debug!(%addr, "Accepted connection");
                        let service = service_fn(move |req| {
                            let server = Arc::clone(&server);
                            async move { Ok::<_, Infallible>(server.handle(req).await) }
                        });

                        if let Err(e) = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            debug!(%addr, error = %e, "Connection closed with error");
                        }
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::HOST;
    use hyper::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    fn server() -> MockServer {
        MockServer::new(Arc::new(InterceptionEngine::new()), &Settings::default())
    }

    fn post(path: &str, body: String) -> Request<Full<Bytes>> {
        Request::post(path).body(Full::new(Bytes::from(body))).unwrap()
    }

    fn api_get(path: &str) -> Request<Full<Bytes>> {
        Request::get(path)
            .header(HOST, "api.test")
            .header("x-forwarded-proto", "https")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn spec(persist: bool) -> String {
        json!({
            "hostname": "https://api.test",
            "method": "GET",
            "path": "/users",
            "statusCode": 200,
            "body": {"ok": true},
            "persist": persist
        })
        .to_string()
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_register_then_request() {
        let server = server();
        let response = server.handle(post("/__cypress_server_mock", spec(false))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = server.handle(api_get("/users")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, Bytes::from_static(br#"{"ok":true}"#));

        let response = server.handle(api_get("/users")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_persisted_mock_answers_repeatedly() {
        let server = server();
        server.handle(post("/__cypress_server_mock", spec(true))).await;

        for _ in 0..2 {
            let response = server.handle(api_get("/users")).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_of(response).await, Bytes::from_static(br#"{"ok":true}"#));
        }

        let response = server.handle(post("/__cypress_clear_mocks", String::new())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let response = server.handle(api_get("/users")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    fn test_seed_registers_specs() {
        let server = server();
        let specs: Vec<MockSpec> = serde_json::from_value(json!([
            {"hostname": "https://a.test", "method": "get", "path": "/", "statusCode": 200},
            {"hostname": "https://b.test", "method": "POST", "path": "/x", "statusCode": 201}
        ]))
        .unwrap();

        assert_eq!(server.seed(&specs).unwrap(), 2);
        assert_eq!(server.engine().active_mock_count(), 2);
    }

    #[rstest]
    fn test_seed_stops_on_invalid_spec() {
        let server = server();
        let specs: Vec<MockSpec> = serde_json::from_value(json!([
            {"hostname": "https://a.test", "method": "get", "path": "/", "statusCode": 200},
            {"hostname": "https://b.test", "method": "BREW", "path": "/", "statusCode": 418}
        ]))
        .unwrap();

        assert!(server.seed(&specs).is_err());
        assert_eq!(server.engine().active_mock_count(), 1);
    }
}
