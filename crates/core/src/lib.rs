//! # EstimAIt Core
//!
//! Domain types and error definitions shared by the EstimAIt knowledge layer.
//! The prompt registry router and the cost assessment engine both depend
//! inward on this crate; it does no I/O of its own.

pub mod confidence;
pub mod error;
pub mod stage;

// Re-export key types at crate root for ergonomics
pub use confidence::Confidence;
pub use error::{AssessmentError, KnowledgeError, RegistryError};
pub use stage::{Stage, recommendation_key_for};
