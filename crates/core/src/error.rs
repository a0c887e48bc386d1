//! Error types for the EstimAIt domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type, returned directly by the
//! crate that owns it.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading one of the YAML knowledge documents.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Failed to read knowledge file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse knowledge file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Knowledge validation failed: {0}")]
    ValidationError(String),

    #[error("No registry file found in {0}")]
    NoRegistry(PathBuf),
}

/// Validation failures raised by the cost assessment engine.
///
/// Every variant names the offending input and the keys that would have
/// been accepted, so callers can surface an actionable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("Region '{region}' not found in matrix. Available: [{}]", .available.join(", "))]
    UnknownRegion {
        region: String,
        available: Vec<String>,
    },

    #[error("Building type '{building_type}' not found. Available: [{}]", .available.join(", "))]
    UnknownBuildingType {
        building_type: String,
        available: Vec<String>,
    },

    #[error("Stage '{stage}' not found in recommendations. Available: [{}]", .available.join(", "))]
    UnknownStage {
        stage: String,
        available: Vec<String>,
    },

    #[error("Building type '{building_type}' has no historical data for region '{region}'. Available: [{}]", .available.join(", "))]
    NoHistoricalData {
        region: String,
        building_type: String,
        available: Vec<String>,
    },
}

/// Typed path-resolution failures inside the prompt registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("No registry entry at {path}")]
    MissingKey { path: String },

    #[error("No prompt variants listed at {path}")]
    EmptyList { path: String },

    #[error("Unexpected registry shape at {path}: expected {expected}")]
    UnexpectedShape {
        path: String,
        expected: &'static str,
    },
}

impl RegistryError {
    /// Whether this error means "nothing is registered there" as opposed to
    /// a malformed tree or a bad layer tag.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::EmptyList { .. })
    }
}
