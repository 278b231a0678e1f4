//! The document-engine seam and its scraper-backed default.
//!
//! The harness consumes HTML parsing as a capability: something that turns a
//! string of markup into a navigable document/window pair and then augments
//! the window with a query surface. [`DomEngine`] is that boundary;
//! [`ScraperEngine`] is the default implementation, backed by the `scraper`
//! crate's HTML5 parser.
//!
//! Augmentation is asynchronous by contract: the engine signals completion,
//! and only then does the window answer queries. The default engine runs the
//! summary build on the blocking pool and converts any panic there into a
//! [`ParseError`] — faults must not escape the parsing boundary.

use crate::dom::{Document, Window};
use crate::error::ParseError;
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Aggregate facts about a parsed document, installed by augmentation.
///
/// Once the summary is present the window is queryable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSummary {
    /// Text of the first `<title>` element, if any.
    pub title: Option<String>,
    /// Total number of elements in the document.
    pub elements: usize,
    /// Number of `<a href>` links.
    pub links: usize,
    /// Number of `<form>` elements.
    pub forms: usize,
}

/// The external DOM-parsing capability consumed by the content parser.
///
/// Implementations supply blank documents and asynchronously augment written
/// windows with a query surface. Custom engines can be injected through
/// [`HarnessOptions`](crate::HarnessOptions).
#[async_trait]
pub trait DomEngine: Send + Sync {
    /// A blank document, ready for the configure-then-write sequence.
    fn blank_document(&self) -> Document;

    /// Augment a written window so it becomes queryable.
    ///
    /// # Errors
    ///
    /// Any fault during augmentation — including a panic in background
    /// work — must surface as [`ParseError::Document`].
    async fn enhance(&self, window: &Window) -> Result<(), ParseError>;
}

/// Default engine backed by the `scraper` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperEngine;

impl ScraperEngine {
    /// Create the default engine.
    pub fn new() -> Self {
        ScraperEngine
    }
}

#[async_trait]
impl DomEngine for ScraperEngine {
    fn blank_document(&self) -> Document {
        Document::new()
    }

    async fn enhance(&self, window: &Window) -> Result<(), ParseError> {
        let source = window.source().to_string();

        // The parse tree is not Send, so the whole build stays on one
        // blocking thread and only the owned summary crosses back.
        let summary = tokio::task::spawn_blocking(move || build_summary(&source))
            .await
            .map_err(|error| ParseError::Document(format!("augmentation failed: {error}")))?;

        if !window.install_summary(summary) {
            tracing::warn!("window augmented more than once");
        }

        Ok(())
    }
}

fn build_summary(source: &str) -> DocumentSummary {
    let html = Html::parse_document(source);

    let title = Selector::parse("title").ok().and_then(|selector| {
        html.select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    });

    DocumentSummary {
        title: title.filter(|text| !text.is_empty()),
        elements: count(&html, "*"),
        links: count(&html, "a[href]"),
        forms: count(&html, "form"),
    }
}

fn count(html: &Html, css: &str) -> usize {
    Selector::parse(css)
        .map(|selector| html.select(&selector).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enhance_installs_summary() {
        let engine = ScraperEngine::new();
        let mut document = engine.blank_document();
        document
            .write(
                r#"<html><head><title> Greetings </title></head>
                <body><a href="/x">x</a><a href="/y">y</a><form></form></body></html>"#,
            )
            .unwrap();
        let window = document.into_window();

        assert!(!window.is_queryable());
        engine.enhance(&window).await.unwrap();

        let summary = window.summary().unwrap();
        assert_eq!(summary.title, Some("Greetings".to_string()));
        assert_eq!(summary.links, 2);
        assert_eq!(summary.forms, 1);
        assert!(summary.elements >= 6);
    }

    #[tokio::test]
    async fn test_enhance_without_title() {
        let engine = ScraperEngine::new();
        let mut document = engine.blank_document();
        document.write("<html><body></body></html>").unwrap();
        let window = document.into_window();

        engine.enhance(&window).await.unwrap();
        assert_eq!(window.title(), None);
        assert!(window.is_queryable());
    }
}
