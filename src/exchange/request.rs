//! The simulated request handed to handlers and returned to callers.
//!
//! A [`Request`] is a cheap-clone handle: the verb call that created it keeps
//! one clone (so the caller can drive the body manually, e.g. via
//! [`Request::send`] in JSON mode) while the handler receives another. All
//! shared state lives behind locks in a single inner allocation.
//!
//! # Examples
//!
//! ```ignore
//! let request = harness.enable_json().post("/users", callback);
//! request.send(&serde_json::json!({"name": "ada"}))?;
//! ```

use crate::error::SendError;
use crate::exchange::BodyStream;
use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;
use uuid::Uuid;

/// Base used to resolve relative targets for the lenient path helpers.
const PATH_BASE: &str = "http://localhost/";

struct RequestInner {
    id: Uuid,
    method: Method,
    url: String,
    headers: RwLock<HeaderMap>,
    json: bool,
    body_tx: Mutex<Option<mpsc::UnboundedSender<Bytes>>>,
    body_rx: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
}

/// A synthetic HTTP request owned by one verb call.
///
/// Created once per verb call by the exchange factory. The method, target
/// URL and id are fixed at construction; headers and the body stream may
/// still be written by the handler or the caller.
///
/// # JSON mode
///
/// When the owning harness has JSON mode enabled, the request carries a
/// `Content-Type: application/json` header and [`Request::send`] is armed:
/// it serializes a payload and finalizes the request body in one step.
#[derive(Clone)]
pub struct Request {
    inner: Arc<RequestInner>,
}

impl Request {
    /// Build a request with an open body channel.
    ///
    /// `json` arms the [`send`](Request::send) capability; headers are
    /// applied afterwards by the factory, one key at a time.
    pub(crate) fn new(method: Method, url: &str, json: bool) -> Self {
        let (body_tx, body_rx) = mpsc::unbounded_channel();
        Request {
            inner: Arc::new(RequestInner {
                id: Uuid::new_v4(),
                method,
                url: url.to_string(),
                headers: RwLock::new(HeaderMap::new()),
                json,
                body_tx: Mutex::new(Some(body_tx)),
                body_rx: Mutex::new(Some(body_rx)),
            }),
        }
    }

    /// Correlation id stamped on this exchange, carried in tracing output.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// The HTTP method of this request.
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// The raw target URL, exactly as the caller supplied it.
    ///
    /// No validation is performed; malformed targets are forwarded as-is.
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Lenient path component of the target URL.
    ///
    /// Relative targets such as `/users?page=2` resolve against a local
    /// base. Returns `None` only when the target cannot be interpreted as a
    /// URL at all.
    pub fn path(&self) -> Option<String> {
        self.parsed_url().map(|url| url.path().to_string())
    }

    /// Lenient query string of the target URL, without the leading `?`.
    pub fn query(&self) -> Option<String> {
        self.parsed_url().and_then(|url| url.query().map(str::to_string))
    }

    fn parsed_url(&self) -> Option<Url> {
        let raw = &self.inner.url;
        Url::parse(raw)
            .or_else(|_| Url::parse(PATH_BASE).and_then(|base| base.join(raw)))
            .ok()
    }

    /// Whether JSON mode was enabled when this request was created.
    pub fn json_enabled(&self) -> bool {
        self.inner.json
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
    /// Names and values the header store rejects are logged and skipped;
    /// this layer performs no validation of its own.
    pub fn set_header(&self, name: &str, value: &str) {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.inner.headers.write().insert(name, value);
            }
            _ => {
                tracing::warn!(id = %self.inner.id, name, "dropping malformed request header");
            }
        }
    }

    /// Snapshot of the current header map.
    pub fn headers(&self) -> HeaderMap {
        self.inner.headers.read().clone()
    }

    /// Write one chunk to the request body.
    ///
    /// Chunks written after [`end`](Request::end) are dropped with a warning.
    pub fn write(&self, chunk: impl Into<Bytes>) {
        let guard = self.inner.body_tx.lock();
        match guard.as_ref() {
            Some(tx) => {
                let _ = tx.send(chunk.into());
            }
            None => {
                tracing::warn!(id = %self.inner.id, "write on finalized request body");
            }
        }
    }

    /// Finalize the request body, signalling end-of-stream to the reader.
    pub fn end(&self) {
        self.inner.body_tx.lock().take();
    }

    /// Serialize `payload` to JSON, write it, and finalize the body.
    ///
    /// Only armed when the owning harness's JSON mode is enabled.
    ///
    /// # Errors
    ///
    /// [`SendError::JsonDisabled`] outside JSON mode,
    /// [`SendError::Serialize`] when the payload does not serialize, and
    /// [`SendError::Closed`] when the body was already finalized.
    pub fn send<T: Serialize>(&self, payload: &T) -> Result<(), SendError> {
        if !self.inner.json {
            return Err(SendError::JsonDisabled);
        }
        let encoded = serde_json::to_vec(payload)?;
        let mut guard = self.inner.body_tx.lock();
        let tx = guard.take().ok_or(SendError::Closed)?;
        let _ = tx.send(Bytes::from(encoded));
        Ok(())
    }

    /// Take the request body stream.
    ///
    /// Handlers call this to consume what the caller writes. The stream can
    /// be taken at most once; later calls return `None`.
    pub fn body_stream(&self) -> Option<BodyStream> {
        self.inner.body_rx.lock().take().map(BodyStream::new)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.inner.id)
            .field("method", &self.inner.method)
            .field("url", &self.inner.url)
            .field("json", &self.inner.json)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_overwrite() {
        let request = Request::new(Method::GET, "/x", false);
        request.set_header("X-Token", "one");
        request.set_header("X-Token", "two");
        assert_eq!(request.header("X-Token"), Some("two".to_string()));
    }

    #[test]
    fn test_malformed_header_is_dropped() {
        let request = Request::new(Method::GET, "/x", false);
        request.set_header("bad header name", "value");
        assert_eq!(request.header("bad header name"), None);
    }

    #[test]
    fn test_path_and_query_are_lenient() {
        let request = Request::new(Method::GET, "/users?page=2", false);
        assert_eq!(request.path(), Some("/users".to_string()));
        assert_eq!(request.query(), Some("page=2".to_string()));

        let absolute = Request::new(Method::GET, "http://example.com/a/b", false);
        assert_eq!(absolute.path(), Some("/a/b".to_string()));
    }

    #[test]
    fn test_send_requires_json_mode() {
        let request = Request::new(Method::POST, "/x", false);
        let result = request.send(&serde_json::json!({"a": 1}));
        assert!(matches!(result, Err(SendError::JsonDisabled)));
    }

    #[test]
    fn test_send_writes_and_finalizes() {
        tokio_test::block_on(async {
            let request = Request::new(Method::POST, "/x", true);
            let mut stream = request.body_stream().unwrap();

            request.send(&serde_json::json!({"a": 1})).unwrap();

            let chunk = stream.next_chunk().await.unwrap();
            assert_eq!(chunk, Bytes::from_static(b"{\"a\":1}"));
            assert_eq!(stream.next_chunk().await, None);

            // A second send hits the closed body.
            assert!(matches!(
                request.send(&serde_json::json!({})),
                Err(SendError::Closed)
            ));
        });
    }

    #[test]
    fn test_body_stream_taken_once() {
        let request = Request::new(Method::GET, "/x", false);
        assert!(request.body_stream().is_some());
        assert!(request.body_stream().is_none());
    }
}
