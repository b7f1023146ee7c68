use blocklog_model::Entity;
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};

/// Conditions for [`EntityStorage::query`](crate::EntityStorage::query).
///
/// All set conditions must match; an empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<String>,
    /// Matches entities with any reference field pointing at this uuid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<EntityUuid>,
}

impl EntityQuery {
    /// A query matching every entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one entity type.
    #[must_use]
    pub fn of_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    /// Restricts to one bundle.
    #[must_use]
    pub fn bundle(mut self, bundle: impl Into<String>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    /// Restricts to entities referencing `uuid`.
    #[must_use]
    pub fn referencing(mut self, uuid: EntityUuid) -> Self {
        self.references = Some(uuid);
        self
    }

    /// Returns true if `entity` satisfies every condition.
    #[must_use]
    pub fn matches(&self, entity: &Entity) -> bool {
        if self.entity_type.is_some_and(|t| t != entity.entity_type()) {
            return false;
        }
        if self.bundle.as_deref().is_some_and(|b| b != entity.bundle()) {
            return false;
        }
        if let Some(uuid) = &self.references {
            return entity
                .fields()
                .iter()
                .any(|f| f.references().contains(uuid));
        }
        true
    }
}
