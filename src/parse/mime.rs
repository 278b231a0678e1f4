//! Mime classification for captured responses.
//!
//! The classifier reduces a response's declared `Content-Type` to its
//! canonical essence — lowercase, parameters stripped — which the content
//! parser uses purely as a dispatch key. Unknown or absent types fall
//! through to pass-through parsing.

use crate::exchange::Response;

/// Canonical mime for JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// Canonical mime for structured-document bodies.
pub const TEXT_HTML: &str = "text/html";

/// Reduce a raw `Content-Type` value to its canonical essence.
///
/// Strips parameters (`; charset=...`), surrounding whitespace, and case:
///
/// ```
/// use probe_http::parse::mime;
///
/// assert_eq!(mime::canonicalize("Text/HTML; charset=utf-8"), "text/html");
/// assert_eq!(mime::canonicalize("application/json"), "application/json");
/// assert_eq!(mime::canonicalize(""), "");
/// ```
pub fn canonicalize(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Classify a response by its declared content type.
///
/// Responses without a `Content-Type` header classify as the empty string,
/// which dispatches to pass-through parsing.
pub fn essence(response: &Response) -> String {
    response
        .content_type()
        .map(|value| canonicalize(&value))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{Request, Response};
    use http::Method;

    #[test]
    fn test_canonicalize_strips_parameters_and_case() {
        assert_eq!(canonicalize("application/JSON; charset=UTF-8"), APPLICATION_JSON);
        assert_eq!(canonicalize("  text/html "), TEXT_HTML);
    }

    #[test]
    fn test_essence_defaults_to_empty() {
        let response = Response::new(Request::new(Method::GET, "/x", false));
        assert_eq!(essence(&response), "");

        response.set_header("Content-Type", "text/html; charset=utf-8");
        assert_eq!(essence(&response), TEXT_HTML);
    }
}
