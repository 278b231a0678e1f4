//! Structured-document construction.
//!
//! A [`Document`] is built in two explicit steps: configure it first (ignore
//! set, harness back-reference), then write content into it. The ordering
//! matters — the document starts interpreting content the moment it is
//! written, so the ignore set must already be in place to suppress matching
//! script resources from the inventory.

use crate::dom::Window;
use crate::error::ParseError;
use crate::harness::Harness;
use crate::parse::IgnoreSet;
use scraper::{Html, Selector};

/// A structured document in the configure-then-write phase of its life.
///
/// Once content has been written, [`Document::into_window`] converts it into
/// the shared, queryable [`Window`] handle that plugins and callers see.
#[derive(Default)]
pub struct Document {
    ignore: IgnoreSet,
    harness: Option<Harness>,
    source: String,
    scripts: Vec<String>,
    suppressed: Vec<String>,
    written: bool,
}

impl Document {
    /// A blank document with an empty ignore set and no back-reference.
    pub fn new() -> Self {
        Document::default()
    }

    /// Attach the set of script resources to suppress.
    ///
    /// Must happen before [`write`](Document::write); entries attached later
    /// have no effect on the already-built inventory.
    pub fn set_ignore(&mut self, ignore: IgnoreSet) {
        self.ignore = ignore;
    }

    /// Attach a back-reference to the owning harness.
    ///
    /// Handler-invoked capabilities reach the harness through the window's
    /// [`harness`](Window::harness) accessor.
    pub fn set_harness(&mut self, harness: Harness) {
        self.harness = Some(harness);
    }

    /// Write HTML content into the document.
    ///
    /// Content is interpreted immediately: the external-script inventory is
    /// built here, with sources matching the ignore set recorded as
    /// suppressed instead of active.
    ///
    /// # Errors
    ///
    /// [`ParseError::Document`] when content was already written.
    pub fn write(&mut self, text: &str) -> Result<(), ParseError> {
        if self.written {
            return Err(ParseError::Document(
                "content already written into document".to_string(),
            ));
        }

        let html = Html::parse_document(text);
        let selector = Selector::parse("script[src]")
            .map_err(|error| ParseError::Document(error.to_string()))?;

        for element in html.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if self.ignore.matches(src) {
                    tracing::debug!(src, "suppressing ignored script resource");
                    self.suppressed.push(src.to_string());
                } else {
                    self.scripts.push(src.to_string());
                }
            }
        }

        self.source = text.to_string();
        self.written = true;
        Ok(())
    }

    /// Convert the written document into its shared window handle.
    ///
    /// The window is not yet queryable; the engine's augmentation step
    /// installs the query surface asynchronously.
    pub fn into_window(self) -> Window {
        Window::new(self.source, self.scripts, self.suppressed, self.harness)
    }
}
