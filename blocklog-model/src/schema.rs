use crate::{FieldItem, ModelError};
use serde::{Deserialize, Serialize};

/// Declares one field of an entity: its identity, value kind and list bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
}

impl FieldDefinition {
    /// Creates a definition with the given kind and cardinality.
    pub fn new(id: &str, label: &str, kind: FieldKind, cardinality: Cardinality) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            cardinality,
            required: false,
        }
    }

    /// Shorthand for a scalar text field.
    pub fn text(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Text, Cardinality::Single)
    }

    /// Shorthand for a scalar numeric field.
    pub fn number(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Number, Cardinality::Single)
    }

    /// Shorthand for a scalar boolean field.
    pub fn bool(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Bool, Cardinality::Single)
    }

    /// Shorthand for an unbounded list of nested block references.
    pub fn blocks(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Blocks, Cardinality::Unbounded)
    }

    /// Shorthand for a single media reference.
    pub fn media(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::Media, Cardinality::Single)
    }

    /// Shorthand for a single library item reference.
    pub fn library_item(id: &str, label: &str) -> Self {
        Self::new(id, label, FieldKind::LibraryItem, Cardinality::Single)
    }

    /// The `options` field every block carries.
    pub fn options() -> Self {
        Self::new(crate::OPTIONS_FIELD, "Options", FieldKind::Options, Cardinality::Single)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides the cardinality.
    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }
}

/// The kind of value a field stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Bool,
    /// References to nested blocks, owned independently in storage.
    Blocks,
    Media,
    LibraryItem,
    /// Free-form string key/value pairs.
    Options,
}

impl FieldKind {
    /// Returns true if `item` may be stored in a field of this kind.
    #[must_use]
    pub fn accepts(&self, item: &FieldItem) -> bool {
        matches!(
            (self, item),
            (Self::Text, FieldItem::Text(_))
                | (Self::Number, FieldItem::Number(_))
                | (Self::Bool, FieldItem::Bool(_))
                | (Self::Blocks | Self::Media | Self::LibraryItem, FieldItem::Reference(_))
                | (Self::Options, FieldItem::Options(_))
        )
    }

    /// Returns true if the field holds block references that take part in the
    /// block tree.
    #[must_use]
    pub const fn is_blocks(&self) -> bool {
        matches!(self, Self::Blocks)
    }
}

/// How many values a field may hold.
///
/// Serialized as an integer: `1` for scalar, `-1` for unbounded and `N` for a
/// list bounded to `N` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Cardinality {
    Single,
    Unbounded,
    Limited(u32),
}

impl Cardinality {
    /// Returns true if a list of `len` values respects this cardinality.
    #[must_use]
    pub fn allows(&self, len: usize) -> bool {
        match self {
            Self::Single => len <= 1,
            Self::Unbounded => true,
            Self::Limited(max) => len <= *max as usize,
        }
    }
}

impl From<Cardinality> for i32 {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => 1,
            Cardinality::Unbounded => -1,
            // Bounds past i32::MAX saturate.
            Cardinality::Limited(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }
}

impl TryFrom<i32> for Cardinality {
    type Error = ModelError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Single),
            -1 => Ok(Self::Unbounded),
            n if n > 1 => Ok(Self::Limited(n as u32)),
            n => Err(ModelError::InvalidCardinality(n)),
        }
    }
}
