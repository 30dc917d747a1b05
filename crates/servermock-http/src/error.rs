//! Middleware error types and their HTTP mapping.

use crate::response::json_error;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use servermock_core::engine::EngineError;
use std::time::Duration;

/// Errors raised while handling a registration or clear request
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("request body not received within {0:?}")]
    BodyTimeout(Duration),
    #[error("failed to read request body: {0}")]
    BodyRead(String),
    #[error("invalid mock definition: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl MiddlewareError {
    pub fn status(&self) -> StatusCode {
        match self {
            MiddlewareError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            MiddlewareError::BodyTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            MiddlewareError::BodyRead(_) | MiddlewareError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            MiddlewareError::Engine(EngineError::Method(_)) => StatusCode::BAD_REQUEST,
            MiddlewareError::Engine(e) if e.is_invalid_definition() => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            MiddlewareError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        json_error(self.status(), &self.to_string())
    }
}
