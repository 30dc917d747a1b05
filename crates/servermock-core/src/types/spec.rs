//! Mock registration payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mock definition as posted by the test suite.
///
/// Only lives for the duration of a registration; the engine keeps the
/// resulting interceptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockSpec {
    /// Origin to intercept, e.g. `https://api.example.com`
    pub hostname: String,
    /// HTTP verb (any case)
    pub method: String,
    /// Exact or pattern path on the origin
    pub path: String,
    /// Status code to reply with
    pub status_code: u16,
    /// Reply body
    #[serde(default)]
    pub body: Value,
    /// Keep the interceptor after it matched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persist: Option<bool>,
}

impl MockSpec {
    /// Verb normalized to lowercase.
    pub fn normalized_method(&self) -> String {
        self.method.to_lowercase()
    }

    pub fn wants_persist(&self) -> bool {
        self.persist.unwrap_or(false)
    }
}

/// A seed file holds either a single spec or a list of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MockSpecs {
    Many(Vec<MockSpec>),
    One(MockSpec),
}

impl MockSpecs {
    pub fn into_vec(self) -> Vec<MockSpec> {
        match self {
            MockSpecs::Many(specs) => specs,
            MockSpecs::One(spec) => vec![spec],
        }
    }
}
