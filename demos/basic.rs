//! Simulate a GET against a small HTML handler and query the parsed page.
//!
//! Run with: `cargo run --example basic`

use anyhow::Result;
use probe_http::{Harness, Response};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let harness = Harness::new(|_request, response: Response| {
        response.set_header("Content-Type", "text/html");
        response.write("<html><head><title>Welcome</title></head>");
        response.write("<body><p class='msg'>hello from the handler</p></body>");
        response.end_with("</html>");
    });

    harness.plugin(|window| {
        let messages = window.select("p.msg").len();
        window.set_data("messages", messages.into());
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    harness.get("/welcome", move |error, response| {
        let _ = tx.send((error, response));
    });

    let (error, response) = rx.await?;
    if let Some(error) = error {
        anyhow::bail!("parse failed: {error}");
    }

    let body = response.body().expect("parsed body");
    let window = body.as_document().expect("document body");

    println!("title:    {:?}", window.title());
    println!("messages: {:?}", window.data("messages"));
    println!(
        "first:    {:?}",
        window.select("p.msg").first().map(|p| p.text().to_string())
    );

    Ok(())
}
