//! The queryable window over a parsed document.
//!
//! A [`Window`] is the handle plugins and callers receive for an HTML-parsed
//! body. It exposes a CSS-selector query surface ([`Window::select`]), the
//! script inventory built at write time, a summary installed by the engine's
//! augmentation step, and a small data map plugins mutate in place.
//!
//! Queries return owned [`Element`] snapshots rather than references into a
//! live tree, so windows stay cheap to clone and safe to move across tasks.

use crate::dom::DocumentSummary;
use crate::error::SelectorError;
use crate::harness::Harness;
use parking_lot::RwLock;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

struct WindowInner {
    source: String,
    scripts: Vec<String>,
    suppressed: Vec<String>,
    harness: Option<Harness>,
    summary: OnceLock<DocumentSummary>,
    data: RwLock<HashMap<String, Value>>,
}

/// Shared handle over a parsed structured document.
///
/// Cheap to clone; every clone sees the same summary, inventory and data
/// map. A window becomes queryable only once the engine's augmentation has
/// completed — before that, [`Window::select`] answers with nothing.
#[derive(Clone)]
pub struct Window {
    inner: Arc<WindowInner>,
}

/// An owned snapshot of one matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
    text: String,
    inner_html: String,
}

impl Element {
    /// The element's tag name, lowercase.
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// An attribute value, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The `id` attribute, if present.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whether the `class` attribute contains `class_name`.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class_name))
            .unwrap_or(false)
    }

    /// Concatenated text content of the element and its descendants.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The element's inner HTML.
    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }
}

impl Window {
    pub(crate) fn new(
        source: String,
        scripts: Vec<String>,
        suppressed: Vec<String>,
        harness: Option<Harness>,
    ) -> Self {
        Window {
            inner: Arc::new(WindowInner {
                source,
                scripts,
                suppressed,
                harness,
                summary: OnceLock::new(),
                data: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The HTML source the document was written with.
    pub fn source(&self) -> &str {
        &self.inner.source
    }

    /// External script sources recorded at write time, ignore set applied.
    pub fn scripts(&self) -> &[String] {
        &self.inner.scripts
    }

    /// Script sources the ignore set suppressed.
    pub fn suppressed_scripts(&self) -> &[String] {
        &self.inner.suppressed
    }

    /// Back-reference to the harness that parsed this document.
    pub fn harness(&self) -> Option<&Harness> {
        self.inner.harness.as_ref()
    }

    /// Whether augmentation has completed and queries will answer.
    pub fn is_queryable(&self) -> bool {
        self.inner.summary.get().is_some()
    }

    /// The document summary installed by augmentation, if completed.
    pub fn summary(&self) -> Option<&DocumentSummary> {
        self.inner.summary.get()
    }

    /// The document title from the summary, if any.
    pub fn title(&self) -> Option<String> {
        self.summary().and_then(|summary| summary.title.clone())
    }

    /// Install the augmentation result. Returns false when already installed.
    pub(crate) fn install_summary(&self, summary: DocumentSummary) -> bool {
        self.inner.summary.set(summary).is_ok()
    }

    /// Query the document with a CSS selector, leniently.
    ///
    /// Invalid selectors and queries against a not-yet-augmented window are
    /// logged and answered with an empty result. Use
    /// [`try_select`](Window::try_select) to observe selector errors.
    pub fn select(&self, css: &str) -> Vec<Element> {
        match self.try_select(css) {
            Ok(elements) => elements,
            Err(error) => {
                tracing::warn!(%error, "lenient select dropped invalid selector");
                Vec::new()
            }
        }
    }

    /// Query the document with a CSS selector.
    ///
    /// Answers with owned element snapshots in document order. A window that
    /// has not been augmented yet answers with an empty result.
    ///
    /// # Errors
    ///
    /// [`SelectorError`] when the selector does not parse.
    pub fn try_select(&self, css: &str) -> Result<Vec<Element>, SelectorError> {
        let selector = Selector::parse(css).map_err(|error| SelectorError {
            selector: css.to_string(),
            message: error.to_string(),
        })?;

        if !self.is_queryable() {
            tracing::warn!(selector = css, "select on window before augmentation");
            return Ok(Vec::new());
        }

        let html = Html::parse_document(&self.inner.source);
        let elements = html
            .select(&selector)
            .map(|element| Element {
                tag_name: element.value().name().to_string(),
                attrs: element
                    .value()
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
                text: element.text().collect::<String>(),
                inner_html: element.inner_html(),
            })
            .collect();

        Ok(elements)
    }

    /// Store a value in the window's data map.
    ///
    /// This is the in-place mutation surface plugins use to leave state for
    /// the caller.
    pub fn set_data(&self, key: impl Into<String>, value: Value) {
        self.inner.data.write().insert(key.into(), value);
    }

    /// Read back a value a plugin (or the caller) stored.
    pub fn data(&self, key: &str) -> Option<Value> {
        self.inner.data.read().get(key).cloned()
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("source_len", &self.inner.source.len())
            .field("scripts", &self.inner.scripts.len())
            .field("suppressed", &self.inner.suppressed.len())
            .field("queryable", &self.is_queryable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queryable(source: &str) -> Window {
        let window = Window::new(source.to_string(), Vec::new(), Vec::new(), None);
        window.install_summary(DocumentSummary::default());
        window
    }

    #[test]
    fn test_select_before_augmentation_is_empty() {
        let window = Window::new(
            "<html><body><p>hi</p></body></html>".to_string(),
            Vec::new(),
            Vec::new(),
            None,
        );
        assert!(!window.is_queryable());
        assert!(window.select("p").is_empty());
    }

    #[test]
    fn test_select_returns_snapshots_in_document_order() {
        let window = queryable(
            r#"<html><body>
                <p id="a" class="msg first">one</p>
                <p id="b">two</p>
            </body></html>"#,
        );

        let hits = window.select("p");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id(), Some("a"));
        assert_eq!(hits[0].text(), "one");
        assert!(hits[0].has_class("msg"));
        assert!(!hits[0].has_class("ms"));
        assert_eq!(hits[1].id(), Some("b"));
        assert_eq!(hits[1].tag_name(), "p");
    }

    #[test]
    fn test_invalid_selector_errors_and_lenient_select_is_empty() {
        let window = queryable("<html></html>");
        assert!(window.try_select("p..[").is_err());
        assert!(window.select("p..[").is_empty());
    }

    #[test]
    fn test_data_map_round_trip() {
        let window = queryable("<html></html>");
        assert_eq!(window.data("k"), None);
        window.set_data("k", serde_json::json!(3));
        assert_eq!(window.data("k"), Some(serde_json::json!(3)));
    }

    #[test]
    fn test_clones_share_state() {
        let window = queryable("<html></html>");
        let clone = window.clone();
        clone.set_data("shared", serde_json::json!(true));
        assert_eq!(window.data("shared"), Some(serde_json::json!(true)));
    }
}
