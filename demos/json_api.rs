//! Drive a JSON echo handler through JSON mode and `send`.
//!
//! Run with: `cargo run --example json_api`

use anyhow::Result;
use probe_http::{Harness, Request, Response};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // The handler echoes whatever JSON the caller sends.
    let harness = Harness::new(|request: Request, response: Response| {
        response.set_header("Content-Type", "application/json");
        let Some(mut body) = request.body_stream() else {
            response.end();
            return;
        };
        tokio::spawn(async move {
            let mut buffer = Vec::new();
            while let Some(chunk) = body.next_chunk().await {
                buffer.extend_from_slice(&chunk);
            }
            response.end_with(bytes::Bytes::from(buffer));
        });
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    let request = harness.enable_json().post("/echo", move |error, response| {
        let _ = tx.send((error, response));
    });

    request.send(&json!({"name": "ada", "role": "engineer"}))?;

    let (error, response) = rx.await?;
    if let Some(error) = error {
        anyhow::bail!("parse failed: {error}");
    }

    let body = response.body().expect("parsed body");
    println!("status: {}", response.status());
    println!("echoed: {}", body.as_json().expect("json body"));

    Ok(())
}
