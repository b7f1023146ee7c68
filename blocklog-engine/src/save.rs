//! The save pass: turning a replayed context into storage writes.

use crate::{EngineResult, Host, MutationContext};
use blocklog_model::{Entity, FieldItem};
use blocklog_storage::EntityStorage;
use blocklog_types::{EntityType, EntityUuid};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Writes computed from a replayed context, applied once the context (and
/// its shared borrow of storage) is gone.
#[derive(Debug, Default)]
pub(crate) struct SavePlan {
    store: Vec<Entity>,
    delete: Vec<EntityUuid>,
}

impl SavePlan {
    /// Collects the writes for the current state of `context`:
    ///
    /// - every live block with overrides folded into its options and its
    ///   block fields rebuilt from proxy order
    /// - the root and session-created entities with rebuilt block fields
    /// - any other stored entity hosting a proxy, with rebuilt block fields
    /// - deletion of blocks that are no longer live, when purging is enabled
    pub(crate) fn from_context(context: &MutationContext<'_>) -> EngineResult<Self> {
        let mut children: HashMap<Host, Vec<FieldItem>> = HashMap::new();
        let mut plan = Self::default();

        let root = context.root();
        let mut written: HashSet<(EntityType, EntityUuid)> = context
            .created_entities()
            .iter()
            .chain(std::iter::once(root))
            .map(|e| (e.entity_type(), e.uuid()))
            .collect();
        let mut foreign = Vec::new();

        for proxy in context.iter() {
            let host = proxy.host();
            if host.entity_type != EntityType::Block
                && written.insert((host.entity_type, host.entity_uuid))
            {
                foreign.push((host.entity_type, host.entity_uuid));
            }
            if context.is_live(&proxy.uuid()) {
                children
                    .entry(proxy.host().clone())
                    .or_default()
                    .push(FieldItem::Reference(proxy.uuid()));
            } else if context.config().purge_deleted_on_save {
                plan.delete.push(proxy.uuid());
            }
        }

        let mut rebuild = |mut entity: Entity| {
            let hosts: Vec<Host> = entity
                .block_fields()
                .map(|f| Host::new(entity.entity_type(), entity.uuid(), f.id.clone()))
                .collect();
            for host in hosts {
                let list = children.remove(&host).unwrap_or_default();
                if let Ok(field) = entity.get_mut(&host.field) {
                    field.list = list;
                }
            }
            entity
        };

        let mut store = vec![rebuild(context.root().clone())];
        for proxy in context.iter().filter(|p| context.is_live(&p.uuid())) {
            let mut block = proxy.block().clone();
            block.set_options(proxy.options());
            store.push(rebuild(block.into_entity()));
        }
        for entity in context.created_entities() {
            store.push(rebuild(entity.clone()));
        }
        for (entity_type, uuid) in foreign {
            if let Some(entity) = context.entity(entity_type, &uuid)? {
                store.push(rebuild(entity));
            }
        }

        plan.store = store;
        Ok(plan)
    }

    /// Applies the plan. Returns the number of stored and deleted entities.
    pub(crate) fn apply(self, storage: &mut dyn EntityStorage) -> EngineResult<(usize, usize)> {
        let stored = self.store.len();
        for entity in self.store {
            storage.store(entity)?;
        }

        let mut deleted = 0;
        for uuid in self.delete {
            if storage.delete(EntityType::Block, &uuid)? {
                deleted += 1;
            } else {
                debug!("Block {} was never stored, nothing to delete", uuid);
            }
        }
        Ok((stored, deleted))
    }
}
