#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Probe-HTTP: in-process handler testing
//!
//! This crate simulates a full HTTP request/response exchange against a
//! handler function without opening a socket. The handler writes into a
//! synthetic [`Response`]; the harness captures the streamed body, parses it
//! by content type, optionally augments parsed HTML documents with
//! registered plugins, and then invokes the caller's callback.
//!
//! ## Overview
//!
//! One verb call walks the whole pipeline:
//!
//! 1. **Exchange construction** — a linked [`Request`]/[`Response`] pair is
//!    built for the method, URL and headers (JSON mode forces a JSON
//!    content type and arms [`Request::send`])
//! 2. **Body capture** — the response's streamed chunks are concatenated in
//!    arrival order once the handler ends the stream
//! 3. **Content dispatch** — the captured text parses as JSON, as a
//!    queryable HTML document, or passes through raw ([`ParsedBody`])
//! 4. **Plugin augmentation** — registered hooks run over parsed documents
//!    in registration order
//! 5. **Callback** — fires with the finished response, strictly after the
//!    handler has returned (or, with parsing disabled, immediately and
//!    before the handler runs)
//!
//! ## Module Structure
//!
//! - **[exchange]** - Simulated request/response pair and body streams
//! - **[capture]** - Streamed body capture into a single string
//! - **[parse]** - Content-type classification and dispatch
//! - **[dom]** - Structured documents, windows, and the engine seam
//! - **[plugin]** - Ordered augmentation hooks over parsed documents
//! - **[harness]** - Orchestrator: verbs, scheduling paths, modes
//! - **[error]** - Error types and result handling

pub mod capture;
pub mod dom;
pub mod error;
pub mod exchange;
pub mod harness;
pub mod parse;
pub mod plugin;

pub use dom::{Document, DocumentSummary, DomEngine, Element, ScraperEngine, Window};
pub use error::{ParseError, Result, SelectorError, SendError};
pub use exchange::{BodyStream, Request, Response};
pub use harness::{Harness, HarnessOptions};
pub use parse::{IgnoreSet, ParsedBody};
pub use plugin::{PluginFn, PluginRegistry};
