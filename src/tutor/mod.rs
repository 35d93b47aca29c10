//! Tutoring pipeline: normalization, semantic chunking, retrieval policy,
//! prompt assembly, quiz validation, and the orchestrating service.

pub mod chunker;
pub mod normalize;
pub mod policy;
pub mod prompts;
pub mod quiz;
mod service;
pub mod types;

pub use quiz::QuizItem;
pub use service::{TutorApi, TutorService};
pub use types::{IngestOutcome, TutorError};
