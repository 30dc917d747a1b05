//! Mock registration middleware.
//!
//! Mounts two routes on a middleware chain:
//! - registration path: buffers a JSON [`MockSpec`] and registers it with the engine
//! - clear path: resets the engine (restore, clean all, activate)
//!
//! Any other request is handed back as [`Outcome::Next`] for the next stage.

use crate::body::{read_body, BoxError};
use crate::error::MiddlewareError;
use crate::response::empty;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use servermock_core::config::settings::MiddlewareSettings;
use servermock_core::engine::{EngineError, InterceptorId};
use servermock_core::{HttpMethod, InterceptionEngine, MockSpec};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of offering a request to the middleware.
#[derive(Debug)]
pub enum Outcome<B> {
    /// The request hit a mounted route and has been answered
    Handled(Response<Full<Bytes>>),
    /// Not a mounted route; pass to the next stage
    Next(Request<B>),
}

/// Registration middleware bound to one engine.
#[derive(Debug, Clone)]
pub struct MockMiddleware {
    engine: Arc<InterceptionEngine>,
    settings: Arc<MiddlewareSettings>,
}

impl MockMiddleware {
    pub fn new(engine: Arc<InterceptionEngine>, settings: MiddlewareSettings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
        }
    }

    pub fn engine(&self) -> &Arc<InterceptionEngine> {
        &self.engine
    }

    pub fn settings(&self) -> &MiddlewareSettings {
        &self.settings
    }

    /// Dispatch a request by path prefix. Routes accept any method.
    pub async fn handle<B>(&self, req: Request<B>) -> Outcome<B>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let path = req.uri().path();

        if mount_matches(&self.settings.registration_path, path) {
            let response = match self.register(req.into_body()).await {
                Ok(_) => empty(StatusCode::OK),
                Err(e) => {
                    warn!(error = %e, "Mock registration failed");
                    e.into_response()
                }
            };
            return Outcome::Handled(response);
        }

        if mount_matches(&self.settings.clear_path, path) {
            self.clear();
            return Outcome::Handled(empty(StatusCode::OK));
        }

        Outcome::Next(req)
    }

    /// Buffer a registration body and register the mock it describes.
    pub async fn register<B>(&self, body: B) -> Result<InterceptorId, MiddlewareError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let bytes = read_body(
            body,
            self.settings.max_body_bytes,
            self.settings.body_timeout(),
        )
        .await?;
        let spec: MockSpec = serde_json::from_slice(&bytes)?;
        self.register_spec(&spec)
    }

    /// Register an already decoded mock.
    pub fn register_spec(&self, spec: &MockSpec) -> Result<InterceptorId, MiddlewareError> {
        let method: HttpMethod = spec
            .normalized_method()
            .parse()
            .map_err(EngineError::from)?;

        let persist = spec.wants_persist() && self.settings.allow_persist;
        if spec.wants_persist() && !persist {
            warn!(
                hostname = %spec.hostname,
                path = %spec.path,
                "persist requested but disabled; registering single-use mock"
            );
        }

        let id = self
            .engine
            .scope(&spec.hostname)?
            .persist_if(persist)
            .intercept(method, &spec.path)?
            .reply(spec.status_code, spec.body.clone())?;

        info!(
            method = method.as_lowercase(),
            hostname = %spec.hostname,
            path = %spec.path,
            status = spec.status_code,
            persist,
            "Registered mock"
        );
        Ok(id)
    }

    /// Reset the engine: restore, then clean all, then activate, as one step.
    pub fn clear(&self) {
        let removed = self.engine.reset();
        info!(removed, "Cleared mocks");
    }
}

/// Prefix match the way connect-style routers mount handlers: the path
/// equals the mount path or continues with `/` or `.` after it. Case-insensitive.
pub fn mount_matches(mount: &str, path: &str) -> bool {
    let mount = mount.trim_end_matches('/');
    if mount.is_empty() {
        return true;
    }

    let Some(head) = path.get(..mount.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(mount) {
        return false;
    }

    matches!(path.as_bytes().get(mount.len()), None | Some(b'/') | Some(b'.'))
}
