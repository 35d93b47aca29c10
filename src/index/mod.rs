//! Session-scoped in-memory vector index.
//!
//! At most one index is live at a time; it is created atomically during
//! ingestion and torn down on the next ingestion or an explicit clear.

pub mod similarity;
mod store;
pub mod types;

pub use store::{SESSION_COLLECTION, SessionIndexStore};
pub use types::{IndexError, Passage, SearchStrategy};
