//! Streaming response relay.
//!
//! # Responsibilities
//! - Relay an upstream event-stream body to the caller chunk by chunk
//! - Set event-stream response headers
//! - Close the upstream connection when the caller goes away
//!
//! # Design Decisions
//! - The upstream body is never buffered; each chunk is yielded as it arrives
//! - Dropping the response body drops the upstream stream, which closes the
//!   upstream connection
//! - A mid-stream upstream error aborts the caller's connection; headers are
//!   already sent, so no error envelope can follow

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::{Stream, StreamExt};

use crate::observability::metrics;

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Build an event-stream response that relays `upstream`'s body.
pub fn event_stream(upstream: reqwest::Response, request_id: &str) -> Response {
    let status = upstream.status();
    let relay = RelayStream::new(upstream.bytes_stream().boxed(), request_id);

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"))
        .header(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
        .header(header::CONNECTION, HeaderValue::from_static("keep-alive"))
        .body(Body::from_stream(relay))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Byte stream from the upstream body, tracking how far the relay got.
pub struct RelayStream {
    inner: ByteStream,
    request_id: String,
    chunks: u64,
    bytes: u64,
    finished: bool,
}

impl RelayStream {
    fn new(inner: ByteStream, request_id: &str) -> Self {
        Self {
            inner,
            request_id: request_id.to_string(),
            chunks: 0,
            bytes: 0,
            finished: false,
        }
    }
}

impl Stream for RelayStream {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                self.chunks += 1;
                self.bytes += chunk.len() as u64;
                metrics::record_stream_chunk();
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                self.finished = true;
                tracing::warn!(
                    request_id = %self.request_id,
                    chunks = self.chunks,
                    error = %e,
                    "Upstream stream failed mid-response"
                );
                Poll::Ready(Some(Err(std::io::Error::other(e))))
            }
            Poll::Ready(None) => {
                self.finished = true;
                tracing::debug!(
                    request_id = %self.request_id,
                    chunks = self.chunks,
                    bytes = self.bytes,
                    "Upstream stream completed"
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for RelayStream {
    fn drop(&mut self) {
        if !self.finished {
            metrics::record_stream_aborted();
            tracing::info!(
                request_id = %self.request_id,
                chunks = self.chunks,
                "Caller disconnected mid-stream, closing upstream connection"
            );
        }
    }
}
