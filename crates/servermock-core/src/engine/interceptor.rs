//! Registered interceptor.

use crate::matching::PathPattern;
use crate::types::method::HttpMethod;
use crate::types::origin::Origin;
use crate::types::reply::MockReply;
use std::fmt;

/// Identifier assigned at registration, unique per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterceptorId(pub u64);

/// Rule answering requests to `origin` + `method` + `path` with `reply`.
#[derive(Debug, Clone)]
pub struct Interceptor {
    pub id: InterceptorId,
    pub origin: Origin,
    pub method: HttpMethod,
    pub path: PathPattern,
    pub reply: MockReply,
    /// Stays registered after a match
    pub persist: bool,
}

impl Interceptor {
    pub fn matches(&self, origin: &Origin, method: HttpMethod, target: &str) -> bool {
        self.origin == *origin && self.method == method && self.path.matches(target).matched
    }
}

impl fmt::Display for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.method, self.origin, self.path.as_str())
    }
}
