//! Interceptor builders.

use crate::engine::error::EngineError;
use crate::engine::interceptor::InterceptorId;
use crate::engine::registry::InterceptionEngine;
use crate::matching::PathPattern;
use crate::types::method::HttpMethod;
use crate::types::origin::Origin;
use crate::types::reply::MockReply;
use serde_json::Value;

/// Interceptors under construction for one origin.
///
/// ```ignore
/// engine
///     .scope("https://api.test")?
///     .persist()
///     .intercept(HttpMethod::Get, "/users")?
///     .reply(200, json!({"ok": true}))?;
/// ```
#[derive(Debug)]
pub struct Scope<'a> {
    engine: &'a InterceptionEngine,
    origin: Origin,
    persist: bool,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(engine: &'a InterceptionEngine, origin: Origin) -> Self {
        Self {
            engine,
            origin,
            persist: false,
        }
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Interceptors created from this scope are not consumed on match.
    pub fn persist(self) -> Self {
        self.persist_if(true)
    }

    pub fn persist_if(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn intercept(
        &self,
        method: HttpMethod,
        path: &str,
    ) -> Result<PendingInterceptor<'a>, EngineError> {
        Ok(PendingInterceptor {
            engine: self.engine,
            origin: self.origin.clone(),
            method,
            path: PathPattern::parse(path)?,
            persist: self.persist,
        })
    }

    pub fn get(&self, path: &str) -> Result<PendingInterceptor<'a>, EngineError> {
        self.intercept(HttpMethod::Get, path)
    }

    pub fn post(&self, path: &str) -> Result<PendingInterceptor<'a>, EngineError> {
        self.intercept(HttpMethod::Post, path)
    }
}

/// Matching half of an interceptor, waiting for its reply.
#[derive(Debug)]
pub struct PendingInterceptor<'a> {
    engine: &'a InterceptionEngine,
    origin: Origin,
    method: HttpMethod,
    path: PathPattern,
    persist: bool,
}

impl PendingInterceptor<'_> {
    /// Register the interceptor with its reply.
    pub fn reply(self, status: u16, body: Value) -> Result<InterceptorId, EngineError> {
        if !(100..=599).contains(&status) {
            return Err(EngineError::InvalidStatus(status));
        }

        Ok(self.engine.insert(
            self.origin,
            self.method,
            self.path,
            MockReply::new(status, body),
            self.persist,
        ))
    }
}
