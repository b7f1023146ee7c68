use crate::{EntityQuery, EntityStorage, StorageResult};
use blocklog_model::{Block, Entity};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// In-memory entity storage.
///
/// Entities are kept sorted by `(entity_type, uuid)` so queries return a
/// stable order. Snapshots can be read from and written to a JSON file of the
/// form `{"entities": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entities: BTreeMap<(EntityType, EntityUuid), Entity>,
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    entities: Vec<Entity>,
}

impl MemoryStorage {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given entities.
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut store = Self::new();
        for entity in entities {
            store.insert(entity);
        }
        store
    }

    /// Inserts or replaces an entity.
    pub fn insert(&mut self, entity: Entity) {
        self.entities
            .insert((entity.entity_type(), entity.uuid()), entity);
    }

    /// Inserts or replaces a block.
    pub fn insert_block(&mut self, block: Block) {
        self.insert(block.into_entity());
    }

    /// Returns the number of stored entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over all entities in `(entity_type, uuid)` order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Parses a JSON snapshot.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Ok(Self::from_entities(snapshot.entities))
    }

    /// Serializes all entities into a JSON snapshot.
    pub fn to_json(&self) -> StorageResult<String> {
        let snapshot = Snapshot {
            entities: self.entities.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Reads a JSON snapshot file.
    pub fn open_json(path: &Path) -> StorageResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Writes a JSON snapshot file, replacing any existing file.
    pub fn write_json(&self, path: &Path) -> StorageResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl EntityStorage for MemoryStorage {
    fn load(&self, entity_type: EntityType, uuid: &EntityUuid) -> StorageResult<Option<Entity>> {
        Ok(self.entities.get(&(entity_type, *uuid)).cloned())
    }

    fn query(&self, query: &EntityQuery) -> StorageResult<Vec<Entity>> {
        Ok(self
            .entities
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn store(&mut self, entity: Entity) -> StorageResult<()> {
        self.insert(entity);
        Ok(())
    }

    fn delete(&mut self, entity_type: EntityType, uuid: &EntityUuid) -> StorageResult<bool> {
        Ok(self.entities.remove(&(entity_type, *uuid)).is_some())
    }
}
