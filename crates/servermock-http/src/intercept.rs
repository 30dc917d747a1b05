//! Outbound interception stage.
//!
//! Answers requests from the system under test out of the engine. Proxy
//! requests (absolute-form URI) are scoped by their URI; direct requests by
//! their `Host` header and `x-forwarded-proto`.

use crate::body::{read_body, BoxError};
use crate::response::{from_reply, text};
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::header::{HeaderMap, HeaderName, CONNECTION, HOST};
use hyper::{Request, Response, StatusCode};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use servermock_core::config::settings::MiddlewareSettings;
use servermock_core::{
    HttpMethod, Interception, InterceptionEngine, Origin, OutboundRequest, Scheme,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "proxy-connection",
    "proxy-authorization",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including those named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Request target resolved from an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub origin: Origin,
    /// `None` when the verb can never be mocked
    pub method: Option<HttpMethod>,
    pub target: String,
    /// Request used proxy (absolute-form) syntax
    pub absolute: bool,
}

/// Resolve origin, method and target of a request.
pub fn resolve_target<B>(req: &Request<B>) -> Option<ResolvedTarget> {
    let uri = req.uri();
    let absolute = uri.scheme().is_some();

    let origin = if absolute {
        Origin::from_uri(uri)?
    } else {
        let scheme = req
            .headers()
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(Scheme::parse)
            .unwrap_or(Scheme::Http);
        let host = req.headers().get(HOST)?.to_str().ok()?;
        Origin::from_host_header(scheme, host)?
    };

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| "/".to_owned());

    Some(ResolvedTarget {
        origin,
        method: HttpMethod::try_from(req.method()).ok(),
        target,
        absolute,
    })
}

/// Final stage of the chain: mocked reply, real network, or an error.
#[derive(Debug, Clone)]
pub struct OutboundInterceptor {
    engine: Arc<InterceptionEngine>,
    passthrough: bool,
    client: Client<HttpConnector, Full<Bytes>>,
    max_body_bytes: usize,
    body_timeout: Duration,
}

impl OutboundInterceptor {
    pub fn new(engine: Arc<InterceptionEngine>, passthrough: bool) -> Self {
        let defaults = MiddlewareSettings::default();
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            engine,
            passthrough,
            client,
            max_body_bytes: defaults.max_body_bytes,
            body_timeout: defaults.body_timeout(),
        }
    }

    /// Bound passthrough request and response bodies.
    pub fn with_body_limits(mut self, max_body_bytes: usize, body_timeout: Duration) -> Self {
        self.max_body_bytes = max_body_bytes;
        self.body_timeout = body_timeout;
        self
    }

    pub async fn respond<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let Some(resolved) = resolve_target(&req) else {
            return text(StatusCode::BAD_REQUEST, "Request has no resolvable host");
        };

        let interception = match resolved.method {
            Some(method) => self.engine.intercept(&OutboundRequest::new(
                resolved.origin.clone(),
                method,
                resolved.target.clone(),
            )),
            None => Interception::Passthrough,
        };

        let description = format!("{} {}{}", req.method(), resolved.origin, resolved.target);
        match interception {
            Interception::Mocked(reply) => {
                debug!(request = %description, status = reply.status, "Answered from mock");
                from_reply(&reply)
            }
            Interception::NoMatch => {
                warn!(request = %description, "No mock matched");
                text(StatusCode::NOT_FOUND, format!("No mock matched {description}"))
            }
            Interception::Passthrough if !resolved.absolute => {
                debug!(request = %description, "No mock registered");
                text(StatusCode::NOT_FOUND, format!("No mock registered for {description}"))
            }
            Interception::Passthrough
                if self.passthrough && resolved.origin.scheme == Scheme::Http =>
            {
                debug!(request = %description, "Passing through to network");
                self.forward(req).await
            }
            Interception::Passthrough => {
                warn!(request = %description, "Passthrough unavailable");
                text(
                    StatusCode::BAD_GATEWAY,
                    format!("No mock registered and passthrough unavailable for {description}"),
                )
            }
        }
    }

    async fn forward<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = req.into_parts();
        let body = match read_body(body, self.max_body_bytes, self.body_timeout).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Passthrough request body rejected");
                return e.into_response();
            }
        };
        strip_hop_by_hop(&mut parts.headers);

        let upstream = match self
            .client
            .request(Request::from_parts(parts, Full::new(body)))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "Passthrough request failed");
                return text(StatusCode::BAD_GATEWAY, format!("Passthrough request failed: {e}"));
            }
        };

        let (mut parts, body) = upstream.into_parts();
        match read_body(body, self.max_body_bytes, self.body_timeout).await {
            Ok(body) => {
                strip_hop_by_hop(&mut parts.headers);
                Response::from_parts(parts, Full::new(body))
            }
            Err(e) => {
                error!(error = %e, "Passthrough response failed");
                text(StatusCode::BAD_GATEWAY, format!("Passthrough response failed: {e}"))
            }
        }
    }
}
