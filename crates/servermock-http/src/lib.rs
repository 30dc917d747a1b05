//! HTTP surface for servermock.
//!
//! Provides the mock registration middleware end-to-end test suites talk to,
//! the outbound interception stage the system under test is proxied through,
//! and a server wiring both to one [`InterceptionEngine`](servermock_core::InterceptionEngine).

pub mod body;
pub mod error;
pub mod intercept;
pub mod logging;
pub mod middleware;
pub mod response;
pub mod server;

pub use error::MiddlewareError;
pub use intercept::OutboundInterceptor;
pub use middleware::{MockMiddleware, Outcome};
pub use server::{BoundServer, MockServer};
