//! Streamed body capture.
//!
//! Subscribes to a response's chunk stream and accumulates every chunk —
//! decoded as UTF-8, in arrival order — into a single string. The returned
//! future resolves when the handler finalizes the stream; a handler that
//! never calls `end` leaves it pending forever (no internal timeout, by
//! contract).
//!
//! The capture is public so that callers running with body parsing disabled
//! can complete the read themselves:
//!
//! ```ignore
//! use probe_http::{capture, Harness, HarnessOptions};
//!
//! let options = HarnessOptions { parse_body: false, ..Default::default() };
//! let harness = Harness::with_options(handler, options);
//! harness.get("/raw", move |_, response| {
//!     tokio::spawn(async move {
//!         let text = capture::collect(&response).await;
//!         println!("raw body: {text}");
//!     });
//! });
//! ```

use crate::exchange::Response;
use futures::StreamExt;

/// Drain the response's body stream into one string.
///
/// Chunks are joined strictly in the order received; invalid UTF-8 is
/// replaced rather than rejected. Each response can be captured at most
/// once — a second call finds the stream already taken and returns an empty
/// string with a warning.
pub async fn collect(response: &Response) -> String {
    let Some(mut stream) = response.chunk_stream() else {
        tracing::warn!(
            id = %response.request().id(),
            "response body stream already captured"
        );
        return String::new();
    };

    let mut buffer = String::new();
    let mut chunks = 0usize;

    while let Some(chunk) = stream.next().await {
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        chunks += 1;
    }

    tracing::trace!(
        id = %response.request().id(),
        chunks,
        bytes = buffer.len(),
        "captured response body"
    );

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::{Request, Response};
    use http::Method;

    fn response() -> Response {
        Response::new(Request::new(Method::GET, "/x", false))
    }

    #[tokio::test]
    async fn test_chunks_concatenate_in_order() {
        let response = response();
        response.write("<html>");
        response.write("<body>hi</body>");
        response.end_with("</html>");

        let text = collect(&response).await;
        assert_eq!(text, "<html><body>hi</body></html>");
    }

    #[tokio::test]
    async fn test_empty_body() {
        let response = response();
        response.end();
        assert_eq!(collect(&response).await, "");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let response = response();
        response.write(bytes::Bytes::from_static(&[0xff, 0xfe]));
        response.end();

        let text = collect(&response).await;
        assert_eq!(text, "\u{fffd}\u{fffd}");
    }

    #[tokio::test]
    async fn test_second_capture_yields_empty() {
        let response = response();
        response.end_with("once");

        assert_eq!(collect(&response).await, "once");
        assert_eq!(collect(&response).await, "");
    }
}
