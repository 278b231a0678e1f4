//! The harness orchestrator: verb entry points, dispatch, and modes.
//!
//! A [`Harness`] wraps one caller-supplied handler function and exposes
//! verb-shaped entry points (`get`/`post`/`put`/`delete`). Each call builds
//! a linked request/response pair, arranges for the response body to be
//! captured and parsed, invokes the handler synchronously, and returns the
//! request so the caller can keep driving it.
//!
//! # Request lifecycle
//!
//! With body parsing enabled (the default), one exchange moves through
//! `created → dispatched → body streaming → parsed → callback fired`. The
//! callback task is spawned before the handler runs but cannot execute until
//! the dispatching call stack unwinds — on a current-thread runtime the
//! callback therefore always observes a handler that has already returned.
//!
//! With body parsing disabled, the streaming and parsing stages are skipped
//! and the lifecycle collapses to `created → callback fired → dispatched`:
//! the callback deliberately fires with the unparsed response *before* the
//! handler is invoked. Callers in this mode own the body read themselves
//! (see [`capture::collect`](crate::capture::collect)).
//!
//! # Examples
//!
//! ```ignore
//! use probe_http::{Harness, Response};
//!
//! let harness = Harness::new(|_request, response: Response| {
//!     response.set_header("Content-Type", "application/json");
//!     response.end_with(r#"{"ok": true}"#);
//! });
//!
//! harness.get("/health", |error, response| {
//!     assert!(error.is_none());
//!     println!("body: {:?}", response.body());
//! });
//! ```
//!
//! # Concurrency
//!
//! Designed for tokio's current-thread runtime: scheduling is cooperative
//! and there is no parallelism to reason about. Exchanges started through
//! the same harness race independently and share nothing mutable beyond the
//! append-only plugin registry. There is no timeout — a handler that never
//! ends its response leaves that callback pending forever.

use crate::capture;
use crate::dom::{DomEngine, ScraperEngine, Window};
use crate::error::ParseError;
use crate::exchange::{self, Request, Response};
use crate::parse::{self, mime, ParsedBody};
use crate::plugin::{PluginFn, PluginRegistry};
use http::Method;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type HandlerFn = Arc<dyn Fn(Request, Response) + Send + Sync + 'static>;
type Callback = Box<dyn FnOnce(Option<ParseError>, Response) + Send + 'static>;

/// Construction options for a [`Harness`].
///
/// ```ignore
/// use probe_http::{Harness, HarnessOptions};
///
/// let options = HarnessOptions {
///     parse_body: false,
///     ..Default::default()
/// };
/// let harness = Harness::with_options(handler, options);
/// ```
#[derive(Clone)]
pub struct HarnessOptions {
    /// Capture and parse response bodies before firing callbacks.
    ///
    /// When false, callbacks fire immediately with the unparsed response,
    /// before the handler is even invoked.
    pub parse_body: bool,

    /// Plugins to seed the registry with, in order.
    pub plugins: Vec<PluginFn>,

    /// Document engine backing the HTML parse path.
    pub engine: Arc<dyn DomEngine>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        HarnessOptions {
            parse_body: true,
            plugins: Vec::new(),
            engine: Arc::new(ScraperEngine::new()),
        }
    }
}

impl HarnessOptions {
    /// Seed one plugin; chainable.
    pub fn plugin<F>(mut self, plugin: F) -> Self
    where
        F: Fn(&Window) + Send + Sync + 'static,
    {
        self.plugins.push(Arc::new(plugin));
        self
    }
}

impl std::fmt::Debug for HarnessOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessOptions")
            .field("parse_body", &self.parse_body)
            .field("plugins", &self.plugins.len())
            .finish_non_exhaustive()
    }
}

struct HarnessInner {
    handler: HandlerFn,
    parse_body: bool,
    plugins: RwLock<PluginRegistry>,
    json: AtomicBool,
    engine: Arc<dyn DomEngine>,
}

/// In-process test harness around one handler function.
///
/// Cheap to clone; clones share the handler, plugin registry and JSON-mode
/// flag. Verb calls must be made inside a tokio runtime when body parsing is
/// enabled (the deferred callback runs as a spawned task).
#[derive(Clone)]
pub struct Harness {
    inner: Arc<HarnessInner>,
}

impl Harness {
    /// Wrap `handler` with default options.
    pub fn new<H>(handler: H) -> Self
    where
        H: Fn(Request, Response) + Send + Sync + 'static,
    {
        Self::with_options(handler, HarnessOptions::default())
    }

    /// Wrap `handler` with explicit options.
    pub fn with_options<H>(handler: H, options: HarnessOptions) -> Self
    where
        H: Fn(Request, Response) + Send + Sync + 'static,
    {
        let mut plugins = PluginRegistry::new();
        for plugin in options.plugins {
            plugins.register_shared(plugin);
        }

        Harness {
            inner: Arc::new(HarnessInner {
                handler: Arc::new(handler),
                parse_body: options.parse_body,
                plugins: RwLock::new(plugins),
                json: AtomicBool::new(false),
                engine: options.engine,
            }),
        }
    }

    /// Simulate a GET request with no extra headers.
    pub fn get<C>(&self, url: &str, callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::GET, url, &[], Box::new(callback))
    }

    /// Simulate a GET request with headers.
    pub fn get_with_headers<C>(&self, url: &str, headers: &[(&str, &str)], callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::GET, url, headers, Box::new(callback))
    }

    /// Simulate a POST request with no extra headers.
    pub fn post<C>(&self, url: &str, callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::POST, url, &[], Box::new(callback))
    }

    /// Simulate a POST request with headers.
    pub fn post_with_headers<C>(&self, url: &str, headers: &[(&str, &str)], callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::POST, url, headers, Box::new(callback))
    }

    /// Simulate a PUT request with no extra headers.
    pub fn put<C>(&self, url: &str, callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::PUT, url, &[], Box::new(callback))
    }

    /// Simulate a PUT request with headers.
    pub fn put_with_headers<C>(&self, url: &str, headers: &[(&str, &str)], callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::PUT, url, headers, Box::new(callback))
    }

    /// Simulate a DELETE request with no extra headers.
    pub fn delete<C>(&self, url: &str, callback: C) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::DELETE, url, &[], Box::new(callback))
    }

    /// Simulate a DELETE request with headers.
    pub fn delete_with_headers<C>(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        callback: C,
    ) -> Request
    where
        C: FnOnce(Option<ParseError>, Response) + Send + 'static,
    {
        self.request(Method::DELETE, url, headers, Box::new(callback))
    }

    /// Register a plugin applied to every HTML-parsed response; chainable.
    pub fn plugin<F>(&self, plugin: F) -> &Self
    where
        F: Fn(&Window) + Send + Sync + 'static,
    {
        self.inner.plugins.write().register(plugin);
        self
    }

    /// Enable JSON mode for this harness; chainable and idempotent.
    ///
    /// Once enabled it cannot be turned off: every subsequently created
    /// request carries `Content-Type: application/json` and an armed
    /// [`send`](Request::send) capability.
    pub fn enable_json(&self) -> &Self {
        self.inner.json.store(true, Ordering::SeqCst);
        self
    }

    /// Whether JSON mode is enabled. Reading has no side effect.
    pub fn json_enabled(&self) -> bool {
        self.inner.json.load(Ordering::SeqCst)
    }

    /// The engine backing structured-document parsing.
    pub(crate) fn engine(&self) -> Arc<dyn DomEngine> {
        Arc::clone(&self.inner.engine)
    }

    /// Run the registry over a parsed window, in registration order.
    pub(crate) fn apply_plugins(&self, window: &Window) {
        self.inner.plugins.read().apply_all(window);
    }

    /// Build the exchange, schedule the callback, dispatch the handler.
    fn request(&self, method: Method, url: &str, headers: &[(&str, &str)], callback: Callback) -> Request {
        let (request, response) = exchange::create(method, url, headers, self.json_enabled());

        if self.inner.parse_body {
            self.dispatch_deferred(response.clone(), callback);
        } else {
            self.dispatch_immediate(response.clone(), callback);
        }

        // The handler runs synchronously in this call stack; its panics
        // propagate to the verb caller uncaught.
        (self.inner.handler)(request.clone(), response);

        request
    }

    /// Deferred path: capture, parse, augment, then fire the callback.
    ///
    /// The task is spawned here but cannot run inside the call stack that
    /// ends the stream; the callback observes the parsed body after the
    /// handler's synchronous writes are all in.
    fn dispatch_deferred(&self, response: Response, callback: Callback) {
        let harness = self.clone();

        tokio::spawn(async move {
            let text = capture::collect(&response).await;
            let media_type = mime::essence(&response);

            let error = match parse::parse(&harness, &media_type, text).await {
                Ok(body) => {
                    response.set_body(body);
                    None
                }
                Err(error) => {
                    tracing::debug!(
                        id = %response.request().id(),
                        %error,
                        "body parse failed; delivering error to callback"
                    );
                    Some(error)
                }
            };

            if let Some(ParsedBody::Document(window)) = response.body() {
                harness.apply_plugins(&window);
            }

            callback(error, response);
        });
    }

    /// Immediate path: the callback fires with the unparsed response,
    /// before the handler has run. The caller owns the body read.
    fn dispatch_immediate(&self, response: Response, callback: Callback) {
        callback(None, response);
    }
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("parse_body", &self.inner.parse_body)
            .field("json", &self.json_enabled())
            .field("plugins", &self.inner.plugins.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_json_is_sticky_and_idempotent() {
        let harness = Harness::new(|_request, _response| {});
        assert!(!harness.json_enabled());

        harness.enable_json();
        assert!(harness.json_enabled());

        // Second enable changes nothing.
        harness.enable_json();
        assert!(harness.json_enabled());
    }

    #[test]
    fn test_plugin_registration_is_chainable() {
        let harness = Harness::new(|_request, _response| {});
        harness.plugin(|_| {}).plugin(|_| {});
        assert_eq!(harness.inner.plugins.read().len(), 2);
    }

    #[test]
    fn test_options_seed_plugins() {
        let options = HarnessOptions::default().plugin(|_| {}).plugin(|_| {});
        let harness = Harness::with_options(|_request, _response| {}, options);
        assert_eq!(harness.inner.plugins.read().len(), 2);
    }

    #[tokio::test]
    async fn test_verb_returns_the_request() {
        let harness = Harness::new(|_request, response: Response| response.end());
        let request = harness.put("/thing", |_error, _response| {});
        assert_eq!(request.method(), &Method::PUT);
        assert_eq!(request.url(), "/thing");
    }

    #[tokio::test]
    async fn test_headers_reach_the_handler() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let tx = parking_lot::Mutex::new(Some(tx));

        let harness = Harness::new(move |request: Request, response: Response| {
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(request.header("X-Probe"));
            }
            response.end();
        });

        harness.get_with_headers("/h", &[("X-Probe", "yes")], |_error, _response| {});
        assert_eq!(rx.await.unwrap(), Some("yes".to_string()));
    }
}
