use crate::{EntityQuery, StorageResult};
use blocklog_model::{Block, Bundle, Entity};
use blocklog_types::{EntityType, EntityUuid};

/// The entity storage collaborator.
///
/// Storage is the ground truth every replay starts from. The engine only
/// reads from it while replaying; writes happen in the save pass.
pub trait EntityStorage {
    /// Loads an entity by type and uuid.
    fn load(&self, entity_type: EntityType, uuid: &EntityUuid) -> StorageResult<Option<Entity>>;

    /// Returns all entities matching the query.
    fn query(&self, query: &EntityQuery) -> StorageResult<Vec<Entity>>;

    /// Inserts or replaces an entity.
    fn store(&mut self, entity: Entity) -> StorageResult<()>;

    /// Physically removes an entity. Returns false if it did not exist.
    fn delete(&mut self, entity_type: EntityType, uuid: &EntityUuid) -> StorageResult<bool>;

    /// Creates a new, unsaved block of `bundle` with its default values.
    ///
    /// The block is not stored; it lives in the caller's working set until it
    /// is saved.
    fn create(&self, bundle: Bundle, uuid: EntityUuid) -> Block {
        Block::new(bundle, uuid)
    }

    /// Loads a block. Stored entities that are not valid blocks are errors.
    fn load_block(&self, uuid: &EntityUuid) -> StorageResult<Option<Block>> {
        match self.load(EntityType::Block, uuid)? {
            Some(entity) => Ok(Some(Block::from_entity(entity)?)),
            None => Ok(None),
        }
    }
}
