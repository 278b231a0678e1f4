//! Structured documents and the engine that builds them.
//!
//! HTML-typed response bodies become navigable documents: a [`Document`] is
//! configured and written in two explicit steps, converted into a shared
//! [`Window`], and asynchronously augmented by a [`DomEngine`] so it can
//! answer CSS-selector queries. Plugins receive the augmented window.
//!
//! # Module Organization
//!
//! ```text
//! dom/
//! ├── document - Configure-then-write construction phase
//! ├── window   - Shared queryable handle, element snapshots, data map
//! └── engine   - DomEngine seam + scraper-backed default
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Document`] | A document between construction and write |
//! | [`Window`] | Queryable handle over the parsed content |
//! | [`Element`] | Owned snapshot of one query hit |
//! | [`DomEngine`] | External parsing capability boundary |
//! | [`ScraperEngine`] | Default engine (scraper crate) |
//! | [`DocumentSummary`] | Aggregate facts installed by augmentation |

mod document;
mod engine;
mod window;

pub use document::Document;
pub use engine::{DocumentSummary, DomEngine, ScraperEngine};
pub use window::{Element, Window};
