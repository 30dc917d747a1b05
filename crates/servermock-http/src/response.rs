//! Response builders.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use servermock_core::types::reply::{CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
use servermock_core::MockReply;

pub fn empty(status: StatusCode) -> Response<Full<Bytes>> {
    with_status(Response::new(Full::new(Bytes::new())), status)
}

pub fn text(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    let mut response = with_status(Response::new(Full::new(Bytes::from(message.into()))), status);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT));
    response
}

/// `{"error": message}` body
pub fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": message }).to_string();
    let mut response = with_status(Response::new(Full::new(Bytes::from(body))), status);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
    response
}

pub fn from_reply(reply: &MockReply) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Full::new(Bytes::from(reply.body_bytes()));
    let mut response = with_status(Response::new(body), status);
    if let Some(content_type) = reply.content_type() {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

fn with_status(mut response: Response<Full<Bytes>>, status: StatusCode) -> Response<Full<Bytes>> {
    *response.status_mut() = status;
    response
}
