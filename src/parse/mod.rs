//! Content-type dispatch over captured bodies.
//!
//! Once a response's streamed body has been captured, the parser routes the
//! raw text by its classified mime type:
//!
//! | Mime | Result |
//! |------|--------|
//! | `application/json` | [`ParsedBody::Json`] via `serde_json` |
//! | `text/html` | [`ParsedBody::Document`] — a queryable [`Window`] |
//! | anything else | [`ParsedBody::Raw`], the text unchanged |
//!
//! The HTML path is the involved one: a fresh ignore set and a
//! back-reference to the owning harness are configured onto a blank document
//! **before** any content is written into it (the document starts
//! interpreting content on write), and the engine's augmentation step runs
//! asynchronously afterwards. Every fault on that path is caught and
//! surfaced as a [`ParseError`] — nothing escapes this boundary.
//!
//! JSON and pass-through parsing complete synchronously.

pub mod mime;

mod ignore;

pub use ignore::{IgnoreSet, IGNORE_FILE};

use crate::dom::Window;
use crate::error::ParseError;
use crate::harness::Harness;
use serde_json::Value;

/// The classified result of parsing a captured body.
///
/// Exactly one variant is populated, selected by the response's canonical
/// mime type.
#[derive(Clone, Debug)]
pub enum ParsedBody {
    /// A decoded `application/json` body — any JSON value, including
    /// `null`, arrays and bare primitives.
    Json(Value),
    /// A parsed `text/html` body, wrapped in a queryable window.
    Document(Window),
    /// Any other body, passed through unchanged.
    Raw(String),
}

impl ParsedBody {
    /// The decoded JSON value, when this is the JSON variant.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ParsedBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The parsed document window, when this is the Document variant.
    pub fn as_document(&self) -> Option<&Window> {
        match self {
            ParsedBody::Document(window) => Some(window),
            _ => None,
        }
    }

    /// The raw text, when this is the pass-through variant.
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            ParsedBody::Raw(text) => Some(text),
            _ => None,
        }
    }

    /// Variant name, for logs and assertions.
    pub fn variant(&self) -> &'static str {
        match self {
            ParsedBody::Json(_) => "json",
            ParsedBody::Document(_) => "document",
            ParsedBody::Raw(_) => "raw",
        }
    }
}

/// Parse a captured body according to its canonical mime type.
///
/// `harness` supplies the document engine and is threaded onto constructed
/// documents as their back-reference.
pub(crate) async fn parse(
    harness: &Harness,
    media_type: &str,
    text: String,
) -> Result<ParsedBody, ParseError> {
    match media_type {
        mime::APPLICATION_JSON => {
            let value = serde_json::from_str(&text).map_err(ParseError::Json)?;
            Ok(ParsedBody::Json(value))
        }
        mime::TEXT_HTML => parse_document(harness, &text).await.map(ParsedBody::Document),
        other => {
            tracing::trace!(mime = other, "passing body through unparsed");
            Ok(ParsedBody::Raw(text))
        }
    }
}

/// Build and augment a queryable document from HTML text.
///
/// The ignore set is re-read for every parse, and configuration (ignore set,
/// harness back-reference) happens strictly before content is written.
async fn parse_document(harness: &Harness, text: &str) -> Result<Window, ParseError> {
    let engine = harness.engine();

    let mut document = engine.blank_document();
    document.set_ignore(IgnoreSet::load());
    document.set_harness(harness.clone());
    document.write(text)?;

    let window = document.into_window();
    engine.enhance(&window).await?;

    tracing::debug!(
        scripts = window.scripts().len(),
        suppressed = window.suppressed_scripts().len(),
        "parsed structured document"
    );

    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Harness;
    use serde_json::json;

    fn harness() -> Harness {
        Harness::new(|_request, _response| {})
    }

    #[tokio::test]
    async fn test_json_decodes_structurally() {
        let body = parse(&harness(), mime::APPLICATION_JSON, r#"{"a":[1,2]}"#.into())
            .await
            .unwrap();
        assert_eq!(body.as_json(), Some(&json!({"a": [1, 2]})));
    }

    #[tokio::test]
    async fn test_json_accepts_primitives_and_null() {
        for (text, expected) in [("null", json!(null)), ("3", json!(3)), ("[]", json!([]))] {
            let body = parse(&harness(), mime::APPLICATION_JSON, text.into())
                .await
                .unwrap();
            assert_eq!(body.as_json(), Some(&expected));
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_parse_error() {
        let result = parse(&harness(), mime::APPLICATION_JSON, "{nope".into()).await;
        assert!(matches!(result, Err(ParseError::Json(_))));
    }

    #[tokio::test]
    async fn test_unknown_mime_passes_through() {
        let text = "arbitrary: bytes";
        let body = parse(&harness(), "text/plain", text.into()).await.unwrap();
        assert_eq!(body.as_raw(), Some(text));

        let body = parse(&harness(), "", "no declared type".into()).await.unwrap();
        assert_eq!(body.as_raw(), Some("no declared type"));
    }

    #[tokio::test]
    async fn test_html_yields_queryable_document() {
        let body = parse(
            &harness(),
            mime::TEXT_HTML,
            "<html><head><title>T</title></head><body><p>hi</p></body></html>".into(),
        )
        .await
        .unwrap();

        let window = body.as_document().unwrap();
        assert!(window.is_queryable());
        assert_eq!(window.title(), Some("T".to_string()));
        assert_eq!(window.select("p").len(), 1);
    }

    #[tokio::test]
    async fn test_document_carries_harness_back_reference() {
        let harness = harness();
        let body = parse(&harness, mime::TEXT_HTML, "<html></html>".into())
            .await
            .unwrap();
        assert!(body.as_document().unwrap().harness().is_some());
    }
}
