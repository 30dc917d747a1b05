//! Core library for servermock.
//!
//! Holds the interception engine outbound requests are answered from, the
//! mock definitions posted by test suites, path matching and configuration
//! loading. The HTTP surface lives in `servermock-http`.

pub mod config;
pub mod engine;
pub mod matching;
pub mod types;

pub use engine::{EngineError, Interception, InterceptionEngine, OutboundRequest};
pub use types::method::HttpMethod;
pub use types::origin::{Origin, Scheme};
pub use types::reply::MockReply;
pub use types::spec::MockSpec;
