//! Streaming body channel shared by requests and responses.
//!
//! Both sides of a simulated exchange carry a body as an ordered stream of
//! [`Bytes`] chunks over an unbounded channel: the writer pushes chunks and
//! closes the channel to signal end-of-stream, the reader drains them in
//! arrival order. [`BodyStream`] is the reader half, handed out at most once
//! per request or response.
//!
//! # Examples
//!
//! ```ignore
//! use futures::StreamExt;
//!
//! let mut stream = response.body_stream().expect("stream already taken");
//! while let Some(chunk) = stream.next().await {
//!     println!("chunk: {} bytes", chunk.len());
//! }
//! // `None` means the writer called `end()`.
//! ```

use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// The read half of a simulated body.
///
/// Yields chunks in the exact order they were written; the stream terminates
/// once the writer finalizes the body. There is no timeout — a writer that
/// never ends leaves the reader pending.
pub struct BodyStream {
    receiver: UnboundedReceiverStream<Bytes>,
}

impl BodyStream {
    /// Wrap the receiver half of a body channel.
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<Bytes>) -> Self {
        BodyStream {
            receiver: UnboundedReceiverStream::new(receiver),
        }
    }

    /// Receive the next chunk, or `None` once the body has ended.
    pub async fn next_chunk(&mut self) -> Option<Bytes> {
        use futures::StreamExt;
        self.receiver.next().await
    }
}

impl Stream for BodyStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl std::fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BodyStream").finish_non_exhaustive()
    }
}
