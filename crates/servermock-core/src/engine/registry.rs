//! Interception engine owning the mock table.

use crate::engine::error::EngineError;
use crate::engine::interceptor::{Interceptor, InterceptorId};
use crate::engine::scope::Scope;
use crate::matching::PathPattern;
use crate::types::method::HttpMethod;
use crate::types::origin::Origin;
use crate::types::reply::MockReply;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Outbound request made by the system under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub origin: Origin,
    pub method: HttpMethod,
    /// Path plus optional query string
    pub target: String,
}

impl OutboundRequest {
    pub fn new(origin: Origin, method: HttpMethod, target: impl Into<String>) -> Self {
        Self {
            origin,
            method,
            target: target.into(),
        }
    }
}

/// Outcome of looking up an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interception {
    /// An interceptor matched; answer with its reply
    Mocked(MockReply),
    /// Interceptors exist for the origin but none matched
    NoMatch,
    /// Engine inactive or origin not intercepted; use the real network
    Passthrough,
}

#[derive(Debug)]
struct EngineState {
    active: bool,
    next_id: u64,
    interceptors: Vec<Interceptor>,
}

/// Mock table shared by the registration middleware and the outbound
/// interception stage.
///
/// Each engine is independent; wrap it in an `Arc` to share it between
/// the components of one server.
#[derive(Debug)]
pub struct InterceptionEngine {
    state: Mutex<EngineState>,
}

impl InterceptionEngine {
    /// Create an active engine with an empty table.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EngineState {
                active: true,
                next_id: 1,
                interceptors: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineState> {
        // Every critical section leaves the state consistent, so a poisoned
        // lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start building interceptors for `hostname`.
    pub fn scope(&self, hostname: &str) -> Result<Scope<'_>, EngineError> {
        Ok(Scope::new(self, Origin::parse(hostname)?))
    }

    pub(crate) fn insert(
        &self,
        origin: Origin,
        method: HttpMethod,
        path: PathPattern,
        reply: MockReply,
        persist: bool,
    ) -> InterceptorId {
        let mut state = self.lock();
        let id = InterceptorId(state.next_id);
        state.next_id += 1;

        let interceptor = Interceptor {
            id,
            origin,
            method,
            path,
            reply,
            persist,
        };
        debug!(interceptor = %interceptor, persist, "Registered interceptor");
        state.interceptors.push(interceptor);
        id
    }

    /// Answer an outbound request from the table.
    ///
    /// The first matching interceptor in registration order wins. Interceptors
    /// without `persist` are removed once they matched.
    pub fn intercept(&self, request: &OutboundRequest) -> Interception {
        let mut state = self.lock();
        if !state.active {
            return Interception::Passthrough;
        }

        let position = state
            .interceptors
            .iter()
            .position(|i| i.matches(&request.origin, request.method, &request.target));

        match position {
            Some(index) => {
                let interceptor = &state.interceptors[index];
                let reply = interceptor.reply.clone();
                if interceptor.persist {
                    trace!(interceptor = %interceptor, "Matched persistent interceptor");
                } else {
                    let consumed = state.interceptors.remove(index);
                    debug!(interceptor = %consumed, "Consumed interceptor");
                }
                Interception::Mocked(reply)
            }
            None if state
                .interceptors
                .iter()
                .any(|i| i.origin == request.origin) =>
            {
                Interception::NoMatch
            }
            None => Interception::Passthrough,
        }
    }

    /// Stop intercepting. Registered interceptors are kept.
    pub fn restore(&self) {
        let mut state = self.lock();
        if state.active {
            debug!("Interception restored");
        }
        state.active = false;
    }

    /// Remove every registered interceptor.
    pub fn clean_all(&self) {
        let mut state = self.lock();
        let removed = state.interceptors.len();
        state.interceptors.clear();
        debug!(removed, "Cleaned all interceptors");
    }

    /// Resume intercepting after [`InterceptionEngine::restore`].
    pub fn activate(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.active {
            return Err(EngineError::AlreadyActive);
        }
        state.active = true;
        debug!("Interception activated");
        Ok(())
    }

    /// Restore, clean all and activate under one lock.
    ///
    /// Concurrent resets never observe each other's intermediate state, so
    /// the engine always ends active and empty. Returns the number of
    /// interceptors removed.
    pub fn reset(&self) -> usize {
        let mut state = self.lock();
        state.active = false;
        let removed = state.interceptors.len();
        state.interceptors.clear();
        state.active = true;
        debug!(removed, "Interception reset");
        removed
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Descriptions of the interceptors still registered, e.g. `GET https://api.test:443/users`.
    pub fn pending_mocks(&self) -> Vec<String> {
        self.lock()
            .interceptors
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn active_mock_count(&self) -> usize {
        self.lock().interceptors.len()
    }

    /// Whether every single-use interceptor has been consumed.
    pub fn is_done(&self) -> bool {
        self.lock().interceptors.iter().all(|i| i.persist)
    }
}

impl Default for InterceptionEngine {
    fn default() -> Self {
        Self::new()
    }
}
