//! Simulated request/response exchanges.
//!
//! Everything a handler touches lives here: the synthetic [`Request`], the
//! [`Response`] it writes into, and the streaming [`BodyStream`] channel
//! both sides carry their bodies over. The private `factory` builds one
//! linked pair per verb call.
//!
//! # Module Organization
//!
//! ```text
//! exchange/
//! ├── request  - Request handle (headers, body driving, JSON send)
//! ├── response - Response handle (status, headers, streamed body, parsed body slot)
//! ├── body     - Ordered chunk stream shared by both sides
//! └── factory  - Linked pair construction per verb call
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Request`] | Synthetic request handed to the handler and the caller |
//! | [`Response`] | Synthetic response the handler streams a body into |
//! | [`BodyStream`] | Take-once reader over a body's chunks |

mod body;
mod factory;
mod request;
mod response;

pub use body::BodyStream;
pub use request::Request;
pub use response::Response;

pub(crate) use factory::create;
