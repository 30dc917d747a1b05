//! Bounded request body buffering.

use crate::error::MiddlewareError;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use std::time::Duration;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Buffer a whole request body.
///
/// Fails once more than `max_bytes` arrived or when the body is not
/// complete within `timeout`.
pub async fn read_body<B>(
    body: B,
    max_bytes: usize,
    timeout: Duration,
) -> Result<Bytes, MiddlewareError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let collected = tokio::time::timeout(timeout, Limited::new(body, max_bytes).collect())
        .await
        .map_err(|_| MiddlewareError::BodyTimeout(timeout))?;

    match collected {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(MiddlewareError::BodyTooLarge { limit: max_bytes })
        }
        Err(e) => Err(MiddlewareError::BodyRead(e.to_string())),
    }
}
