//! The simulated response a handler writes into.
//!
//! A [`Response`] is linked to exactly one [`Request`] (it holds a handle,
//! not ownership). The handler mutates it during the synchronous dispatch:
//! status, headers, and streamed body chunks. Once the stream ends, the
//! harness's parsing step stores the classified body in the `body` slot,
//! after which the verb callback observes the finished response.
//!
//! # Lifecycle
//!
//! 1. Built alongside its request by the exchange factory
//! 2. Written to by the handler (`set_status`, `set_header`, `write`, `end`)
//! 3. Body captured and parsed by the harness once the stream ends
//! 4. Handed to the verb callback; no further mutation is valid
//!
//! # Examples
//!
//! ```ignore
//! let harness = Harness::new(|_request, response: Response| {
//!     response.set_status(http::StatusCode::CREATED);
//!     response.set_header("Content-Type", "application/json");
//!     response.write(r#"{"id":"#);
//!     response.end_with(r#"1}"#);
//! });
//! ```

use crate::exchange::{BodyStream, Request};
use crate::parse::ParsedBody;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::mpsc;

struct ResponseInner {
    request: Request,
    status: RwLock<StatusCode>,
    headers: RwLock<HeaderMap>,
    chunk_tx: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    chunk_rx: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
    body: RwLock<Option<ParsedBody>>,
}

/// A synthetic HTTP response, written by the handler and read by the harness.
///
/// Cheap to clone; all clones share the same inner state.
#[derive(Clone)]
pub struct Response {
    inner: Arc<ResponseInner>,
}

impl Response {
    /// Build a response linked to `request`, with an open body channel.
    pub(crate) fn new(request: Request) -> Self {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        Response {
            inner: Arc::new(ResponseInner {
                request,
                status: RwLock::new(StatusCode::OK),
                headers: RwLock::new(HeaderMap::new()),
                chunk_tx: Mutex::new(Some(chunk_tx)),
                chunk_rx: Mutex::new(Some(chunk_rx)),
                body: RwLock::new(None),
            }),
        }
    }

    /// The request this response answers.
    pub fn request(&self) -> &Request {
        &self.inner.request
    }

    /// Current status code (defaults to `200 OK`).
    pub fn status(&self) -> StatusCode {
        *self.inner.status.read()
    }

    /// Set the status code.
    pub fn set_status(&self, status: StatusCode) {
        *self.inner.status.write() = status;
    }

    /// Read a header value as text, if present and textual.
    pub fn header(&self, name: &str) -> Option<String> {
        let headers = self.inner.headers.read();
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// Set a single header, overwriting any previous value.
    ///
    /// Names and values the header store rejects are logged and skipped.
    pub fn set_header(&self, name: &str, value: &str) {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.inner.headers.write().insert(name, value);
            }
            _ => {
                tracing::warn!(
                    id = %self.inner.request.id(),
                    name,
                    "dropping malformed response header"
                );
            }
        }
    }

    /// Snapshot of the current header map.
    pub fn headers(&self) -> HeaderMap {
        self.inner.headers.read().clone()
    }

    /// The declared `Content-Type` header, verbatim.
    pub fn content_type(&self) -> Option<String> {
        self.header(http::header::CONTENT_TYPE.as_str())
    }

    /// Write one chunk to the response body stream.
    ///
    /// Chunks written after [`end`](Response::end) are dropped with a
    /// warning; the stream order is exactly the write order.
    pub fn write(&self, chunk: impl Into<Bytes>) {
        let guard = self.inner.chunk_tx.lock();
        match guard.as_ref() {
            Some(tx) => {
                let _ = tx.send(chunk.into());
            }
            None => {
                tracing::warn!(id = %self.inner.request.id(), "write on ended response");
            }
        }
    }

    /// Finalize the body stream, signalling end-of-stream to the capture.
    ///
    /// The end signal is observed only after every previously written chunk.
    pub fn end(&self) {
        self.inner.chunk_tx.lock().take();
    }

    /// Write one final chunk, then finalize the stream.
    pub fn end_with(&self, chunk: impl Into<Bytes>) {
        self.write(chunk);
        self.end();
    }

    /// Whether the body stream has been finalized.
    pub fn is_ended(&self) -> bool {
        self.inner.chunk_tx.lock().is_none()
    }

    /// The parsed body, once the harness's parsing step has stored it.
    ///
    /// `None` until parsing completes — in particular, always `None` when
    /// the callback fires on the immediate (no-parse) path.
    pub fn body(&self) -> Option<ParsedBody> {
        self.inner.body.read().clone()
    }

    /// Store the parsed body. Called exactly once, by the parsing step.
    pub(crate) fn set_body(&self, body: ParsedBody) {
        *self.inner.body.write() = Some(body);
    }

    /// Take the chunk stream feeding the body capture.
    ///
    /// Taken at most once per response; later calls return `None`.
    pub(crate) fn chunk_stream(&self) -> Option<BodyStream> {
        self.inner.chunk_rx.lock().take().map(BodyStream::new)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("request", &self.inner.request.id())
            .field("status", &self.status())
            .field("ended", &self.is_ended())
            .field("parsed", &self.inner.body.read().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn response() -> Response {
        Response::new(Request::new(Method::GET, "/x", false))
    }

    #[test]
    fn test_defaults() {
        let response = response();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.is_ended());
        assert!(response.body().is_none());
    }

    #[test]
    fn test_write_after_end_is_dropped() {
        tokio_test::block_on(async {
            let response = response();
            let mut stream = response.chunk_stream().unwrap();

            response.write("first");
            response.end();
            response.write("late");

            assert_eq!(stream.next_chunk().await, Some(Bytes::from_static(b"first")));
            assert_eq!(stream.next_chunk().await, None);
        });
    }

    #[test]
    fn test_end_with_writes_then_ends() {
        tokio_test::block_on(async {
            let response = response();
            let mut stream = response.chunk_stream().unwrap();

            response.end_with("tail");
            assert!(response.is_ended());

            assert_eq!(stream.next_chunk().await, Some(Bytes::from_static(b"tail")));
            assert_eq!(stream.next_chunk().await, None);
        });
    }

    #[test]
    fn test_content_type_reads_header() {
        let response = response();
        assert_eq!(response.content_type(), None);
        response.set_header("Content-Type", "text/html; charset=utf-8");
        assert_eq!(
            response.content_type(),
            Some("text/html; charset=utf-8".to_string())
        );
    }

    #[test]
    fn test_chunk_stream_taken_once() {
        let response = response();
        assert!(response.chunk_stream().is_some());
        assert!(response.chunk_stream().is_none());
    }
}
