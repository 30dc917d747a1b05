//! Canned response returned by a matched interceptor.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Mocked response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockReply {
    /// HTTP status code (100-599)
    pub status: u16,
    /// Response body; `Null` means an empty body
    #[serde(default)]
    pub body: Value,
}

impl MockReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Encoded body bytes.
    ///
    /// Strings are sent verbatim, `null` is empty and every other value is
    /// serialized as JSON.
    pub fn body_bytes(&self) -> Vec<u8> {
        match &self.body {
            Value::Null => Vec::new(),
            Value::String(s) => s.as_bytes().to_vec(),
            other => other.to_string().into_bytes(),
        }
    }

    /// Content type matching [`MockReply::body_bytes`], `None` for an empty body.
    pub fn content_type(&self) -> Option<&'static str> {
        match &self.body {
            Value::Null => None,
            Value::String(_) => Some(CONTENT_TYPE_TEXT),
            _ => Some(CONTENT_TYPE_JSON),
        }
    }
}
