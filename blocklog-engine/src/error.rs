//! Error types for the engine.
//!
//! Referential problems (a uuid that is no longer in the working set) are not
//! errors; commands skip them. Everything here is a programmer or
//! environment error.

use blocklog_types::EntityUuid;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while replaying, materializing or saving.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A command addressed a field the bundle does not declare, or passed
    /// values of the wrong kind.
    #[error("model error: {0}")]
    Model(#[from] blocklog_model::ModelError),

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(#[from] blocklog_storage::StorageError),

    /// Serialization/deserialization of the log failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The engine configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A field holding nested blocks was written directly; block order is
    /// changed through `add`, `move` and `delete`.
    #[error("field '{field}' of {uuid} holds nested blocks and cannot be edited directly")]
    BlockField { uuid: EntityUuid, field: String },

    /// The entity passed for replay is not the one the log was recorded for.
    #[error("edit state belongs to {expected}, got root {found}")]
    RootMismatch {
        expected: EntityUuid,
        found: EntityUuid,
    },
}
