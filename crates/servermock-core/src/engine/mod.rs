//! Interception engine.
//!
//! This module provides the mock table outbound requests are answered from:
//! - [`InterceptionEngine`]: Owns active interceptors and the active/restored lifecycle
//! - [`Scope`]: Builder for interceptors bound to one origin
//! - [`OutboundRequest`] / [`Interception`]: Request lookup and its outcome

mod error;
mod interceptor;
mod registry;
mod scope;

pub use error::EngineError;
pub use interceptor::{Interceptor, InterceptorId};
pub use registry::{Interception, InterceptionEngine, OutboundRequest};
pub use scope::{PendingInterceptor, Scope};
