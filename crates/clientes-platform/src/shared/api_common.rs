//! Common API types and utilities

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::{future, stream, Stream, StreamExt, TryStreamExt};
use serde::Serialize;

use super::error::{ApiError, Result};

/// Stream `items` to the client as a JSON array.
///
/// Elements are serialized one at a time as the source stream yields them.
/// An error from the source ends the body early; the status line has already
/// been sent by then, so the failure is only logged.
pub fn json_array_response<S, T>(items: S) -> Response
where
    S: Stream<Item = Result<T>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let open = stream::once(future::ready(Ok::<_, ApiError>(Bytes::from_static(b"["))));
    let close = stream::once(future::ready(Ok::<_, ApiError>(Bytes::from_static(b"]"))));

    let elements = items.enumerate().map(|(index, item)| -> Result<Bytes> {
        let item = item?;
        let mut buf = if index == 0 { Vec::new() } else { vec![b','] };
        serde_json::to_writer(&mut buf, &item)?;
        Ok(Bytes::from(buf))
    });

    let body = open
        .chain(elements)
        .chain(close)
        .inspect_err(|e| tracing::error!(error = %e, "Streaming response aborted"));

    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(body),
    )
        .into_response()
}
