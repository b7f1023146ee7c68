//! Schema self-validation.
//!
//! Violations are reported, never enforced: an entity with an empty required
//! field can still be stored, replayed and rendered.

use crate::{Entity, FieldItem};
use serde::{Deserialize, Serialize};

/// What is wrong with a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field holds no value (or only empty text).
    Required,
    /// The list holds more values than the cardinality allows.
    Cardinality,
}

/// A schema problem reported by an entity about one of its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Entity {
    /// Checks every field against its definition.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        for field in self.fields() {
            let blank = field.list.iter().all(|item| match item {
                FieldItem::Text(s) => s.trim().is_empty(),
                _ => false,
            });
            if field.required && blank {
                violations.push(FieldViolation {
                    field: field.id.clone(),
                    kind: ViolationKind::Required,
                    message: format!("{} is required", field.label),
                });
            }
            if !field.cardinality.allows(field.list.len()) {
                violations.push(FieldViolation {
                    field: field.id.clone(),
                    kind: ViolationKind::Cardinality,
                    message: format!(
                        "{} holds {} values but allows at most {}",
                        field.label,
                        field.list.len(),
                        i32::from(field.cardinality)
                    ),
                });
            }
        }
        violations
    }
}
