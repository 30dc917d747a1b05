//! Settings for the registration middleware and the mock server.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_REGISTRATION_PATH: &str = "/__cypress_server_mock";
pub const DEFAULT_CLEAR_PATH: &str = "/__cypress_clear_mocks";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
pub const DEFAULT_BODY_TIMEOUT_MS: u64 = 10_000;

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub middleware: MiddlewareSettings,
}

/// Mock server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the server listens on
    pub listen: SocketAddr,
    /// Forward unmocked proxy requests to the real network
    pub passthrough: bool,
    /// Glob pattern of seed mock files registered at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mocks: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8888)),
            passthrough: true,
            mocks: None,
        }
    }
}

/// Registration middleware settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareSettings {
    /// Mount path of the register route
    pub registration_path: String,
    /// Mount path of the clear route
    pub clear_path: String,
    /// Honour `persist` in registrations
    pub allow_persist: bool,
    /// Largest accepted registration body
    pub max_body_bytes: usize,
    /// Time allowed for the whole registration body to arrive
    pub body_timeout_ms: u64,
}

impl MiddlewareSettings {
    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }
}

impl Default for MiddlewareSettings {
    fn default() -> Self {
        Self {
            registration_path: DEFAULT_REGISTRATION_PATH.to_string(),
            clear_path: DEFAULT_CLEAR_PATH.to_string(),
            allow_persist: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            body_timeout_ms: DEFAULT_BODY_TIMEOUT_MS,
        }
    }
}
