//! Core type definitions for blocklog.
//!
//! This crate defines the small, dependency-free vocabulary shared by every
//! other crate in the workspace:
//! - Entity identifiers (UUID v7) and the entity type discriminator
//! - Hybrid logical timestamps for mutation records
//!
//! Block bundles, fields and mutation commands live in their own crates.

mod ids;
mod timestamp;

pub use ids::{EntityType, EntityUuid};
pub use timestamp::LogTimestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown entity type: {0}")]
    UnknownEntityType(String),
}
