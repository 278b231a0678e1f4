//! Error types and result handling.
//!
//! The harness recovers exactly one class of fault — parse failures — and
//! delivers them through the verb callback's error slot. Everything else
//! (handler panics, unexpected filesystem faults) is left to propagate.
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ParseError`] | Body parsing failed (malformed JSON, document fault) |
//! | [`SendError`] | Driving a request body via `send` failed |
//! | [`SelectorError`] | A CSS selector handed to the query surface is invalid |
//! | [`Result`] | Crate-wide alias defaulting to [`ParseError`] |

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// A failure while parsing a captured response body.
///
/// Parse errors never escape the harness as panics; they are handed to the
/// verb callback's error parameter with the (unparsed) response alongside.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body declared `application/json` but did not decode.
    #[error("malformed json body: {0}")]
    Json(#[from] serde_json::Error),

    /// Constructing or augmenting a structured document failed.
    ///
    /// This covers every fault on the HTML path, including a panic inside
    /// the blocking augmentation task.
    #[error("document parse failed: {0}")]
    Document(String),
}

/// A failure while driving a request body through [`Request::send`].
///
/// [`Request::send`]: crate::Request::send
#[derive(Debug, Error)]
pub enum SendError {
    /// `send` is only armed when the harness's JSON mode is enabled.
    #[error("json mode is not enabled for this request")]
    JsonDisabled,

    /// The payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The request body was already finalized.
    #[error("request body already closed")]
    Closed,
}

/// An invalid CSS selector was handed to [`Window::try_select`].
///
/// The lenient [`Window::select`] logs and returns an empty result instead
/// of surfacing this.
///
/// [`Window::try_select`]: crate::Window::try_select
/// [`Window::select`]: crate::Window::select
#[derive(Debug, Error)]
#[error("invalid selector `{selector}`: {message}")]
pub struct SelectorError {
    /// The selector text as given.
    pub selector: String,
    /// What the selector parser rejected.
    pub message: String,
}
