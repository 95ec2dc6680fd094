// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod classify;
pub mod dedup;
pub mod ingest;
pub mod metrics;
pub mod rank;
pub mod reference;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::classify::{Classification, Classifier};
pub use crate::ingest::types::{Article, Category, RawCandidate, SourceAdapter};
pub use crate::reference::ReferenceData;
