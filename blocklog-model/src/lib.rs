//! Entity and block model for blocklog.
//!
//! Defines the data the mutation engine works on:
//! - [`Entity`] — uuid, entity type, bundle and ordered [`Field`]s
//! - [`FieldDefinition`] / [`FieldKind`] / [`Cardinality`] — field schema
//! - [`Bundle`] / [`Block`] — placeable content units with a static schema
//!   per bundle and a free-form `options` field
//! - [`FieldViolation`] — problems found by self-validation
//!
//! The model is pure data: get, set and serialize. Ordering, placement and
//! history belong to the engine.

mod block;
mod entity;
mod schema;
mod validation;

pub use block::{Block, Bundle};
pub use entity::{Entity, Field, FieldItem};
pub use schema::{Cardinality, FieldDefinition, FieldKind};
pub use validation::{FieldViolation, ViolationKind};

use blocklog_types::{EntityType, EntityUuid};

/// Id of the options field every block declares.
pub const OPTIONS_FIELD: &str = "options";

/// Id of the block list on content pages.
pub const CONTENT_FIELD: &str = "content";

/// Id of the field on a library item referencing its block.
pub const LIBRARY_BLOCK_FIELD: &str = "block";

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Programmer errors raised by the model. None of these are caused by user
/// data; they indicate a caller bug.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown field '{field}' on bundle '{bundle}'")]
    UnknownField { bundle: String, field: String },

    #[error("field '{0}' is already declared")]
    DuplicateField(String),

    #[error("unknown bundle: {0}")]
    UnknownBundle(String),

    #[error("field '{field}' expects {expected:?} values, got {found}")]
    FieldKindMismatch {
        field: String,
        expected: FieldKind,
        found: String,
    },

    #[error("invalid cardinality: {0}")]
    InvalidCardinality(i32),

    #[error("entity {uuid} is a {entity_type}, not a block")]
    NotABlock {
        uuid: EntityUuid,
        entity_type: EntityType,
    },
}
