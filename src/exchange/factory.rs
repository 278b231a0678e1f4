//! Construction of linked request/response pairs.
//!
//! One pair is built per verb call. Headers are applied to the request one
//! key at a time; when the harness's JSON mode is enabled, every request
//! additionally gets a forced `Content-Type: application/json` header and an
//! armed [`send`](crate::Request::send) capability. This layer performs no
//! validation of method or URL shape — malformed values travel onward as-is.

use crate::exchange::{Request, Response};
use http::Method;

/// Build a request and the response linked to it.
///
/// `headers` entries are written singly, in iteration order; entries the
/// header store rejects are dropped with a warning. `json_mode` applies the
/// two JSON-mode effects unconditionally.
pub(crate) fn create(
    method: Method,
    url: &str,
    headers: &[(&str, &str)],
    json_mode: bool,
) -> (Request, Response) {
    let request = Request::new(method, url, json_mode);

    for &(name, value) in headers {
        request.set_header(name, value);
    }

    if json_mode {
        request.set_header(http::header::CONTENT_TYPE.as_str(), "application/json");
    }

    let response = Response::new(request.clone());

    tracing::debug!(
        id = %request.id(),
        method = %request.method(),
        url = request.url(),
        json = json_mode,
        "created simulated exchange"
    );

    (request, response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_links_back_to_request() {
        let (request, response) = create(Method::GET, "/a", &[], false);
        assert_eq!(response.request().id(), request.id());
    }

    #[test]
    fn test_headers_are_applied() {
        let (request, _response) = create(
            Method::POST,
            "/a",
            &[("X-One", "1"), ("X-Two", "2")],
            false,
        );
        assert_eq!(request.header("X-One"), Some("1".to_string()));
        assert_eq!(request.header("X-Two"), Some("2".to_string()));
    }

    #[test]
    fn test_json_mode_forces_content_type() {
        let (request, _response) = create(
            Method::POST,
            "/a",
            &[("Content-Type", "text/plain")],
            true,
        );
        assert_eq!(
            request.header("Content-Type"),
            Some("application/json".to_string())
        );
        assert!(request.json_enabled());
    }

    #[test]
    fn test_without_json_mode_send_is_disarmed() {
        let (request, _response) = create(Method::PUT, "/a", &[], false);
        assert!(!request.json_enabled());
        assert_eq!(request.header("Content-Type"), None);
    }

    #[test]
    fn test_malformed_url_is_forwarded_untouched() {
        let (request, _response) = create(Method::GET, "::not a url::", &[], false);
        assert_eq!(request.url(), "::not a url::");
    }
}
