//! The in-memory working set for one replay.
//!
//! The context holds one [`BlockProxy`] per block reachable from the edited
//! root, in a single flattened order. Proxies live in an arena keyed by uuid
//! and are chained through `prev`/`next` links, so anchor resolution and
//! reinsertion are O(1). The order of a field's list in the output is the
//! order of the proxies hosted by that field, filtered out of the flattened
//! sequence.
//!
//! Use cases:
//! - Anchor-based insert for `add`, `duplicate` and friends
//! - Re-homing for `move`
//! - Grouping by host when materializing

use crate::{BlockProxy, EngineConfig, EngineResult, Host};
use blocklog_model::{Block, Bundle, Entity, FieldKind, ModelError};
use blocklog_storage::{EntityQuery, EntityStorage};
use blocklog_types::{EntityType, EntityUuid};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

#[derive(Debug)]
struct Slot {
    proxy: BlockProxy,
    prev: Option<EntityUuid>,
    next: Option<EntityUuid>,
}

/// The working set commands mutate during replay.
pub struct MutationContext<'a> {
    storage: &'a dyn EntityStorage,
    config: &'a EngineConfig,
    root: Entity,
    slots: HashMap<EntityUuid, Slot>,
    head: Option<EntityUuid>,
    tail: Option<EntityUuid>,
    /// Non-block entities created during the session, e.g. library items.
    created: Vec<Entity>,
}

impl<'a> MutationContext<'a> {
    /// Builds the working set by walking the root's block fields depth-first,
    /// in field declaration order.
    ///
    /// Blocks referenced but missing from storage are skipped with a warning.
    /// A block reachable twice is only proxied at its first position.
    pub fn new(
        storage: &'a dyn EntityStorage,
        root: Entity,
        config: &'a EngineConfig,
    ) -> EngineResult<Self> {
        let mut context = Self {
            storage,
            config,
            root,
            slots: HashMap::new(),
            head: None,
            tail: None,
            created: Vec::new(),
        };

        let children = Self::children_of(&context.root);
        for (host, uuid) in children {
            context.walk(host, uuid)?;
        }

        debug!(
            "Built context for {} with {} proxies",
            context.root.uuid(),
            context.slots.len()
        );
        Ok(context)
    }

    fn children_of(entity: &Entity) -> Vec<(Host, EntityUuid)> {
        entity
            .block_fields()
            .flat_map(|field| {
                let host = Host::new(entity.entity_type(), entity.uuid(), field.id.clone());
                field
                    .references()
                    .into_iter()
                    .map(move |uuid| (host.clone(), uuid))
            })
            .collect()
    }

    fn walk(&mut self, host: Host, uuid: EntityUuid) -> EngineResult<()> {
        if self.slots.contains_key(&uuid) {
            debug!("Block {} is referenced twice, keeping first position", uuid);
            return Ok(());
        }
        let Some(block) = self.storage.load_block(&uuid)? else {
            warn!("Block {} referenced by {} is missing from storage", uuid, host);
            return Ok(());
        };

        let children = Self::children_of(block.entity());
        self.push_back(BlockProxy::new(block, host));
        for (child_host, child) in children {
            self.walk(child_host, child)?;
        }
        Ok(())
    }

    // ── Accessors ──

    /// The edited root entity, as loaded.
    #[must_use]
    pub fn root(&self) -> &Entity {
        &self.root
    }

    #[must_use]
    pub fn storage(&self) -> &'a dyn EntityStorage {
        self.storage
    }

    #[must_use]
    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Number of proxies, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all proxies in flattened order, deleted ones included.
    pub fn iter(&self) -> Proxies<'_, 'a> {
        Proxies {
            context: self,
            cursor: self.head,
        }
    }

    /// Returns the proxy if it is already in the working set.
    #[must_use]
    pub fn proxy(&self, uuid: &EntityUuid) -> Option<&BlockProxy> {
        self.slots.get(uuid).map(|slot| &slot.proxy)
    }

    pub fn proxy_mut(&mut self, uuid: &EntityUuid) -> Option<&mut BlockProxy> {
        self.slots.get_mut(uuid).map(|slot| &mut slot.proxy)
    }

    /// Returns the proxy, loading it from storage when the block exists but
    /// was not reachable from the root walk.
    ///
    /// A lazily loaded block is hosted by the first entity found referencing
    /// it and joins the end of the flattened order, followed by its children.
    /// Returns `None` when the block is unknown or nothing references it.
    pub fn get_proxy(&mut self, uuid: &EntityUuid) -> EngineResult<Option<&mut BlockProxy>> {
        if !self.slots.contains_key(uuid) {
            self.load_detached(uuid)?;
        }
        Ok(self.proxy_mut(uuid))
    }

    fn load_detached(&mut self, uuid: &EntityUuid) -> EngineResult<()> {
        if self.storage.load_block(uuid)?.is_none() {
            debug!("Block {} is not in storage", uuid);
            return Ok(());
        }
        let Some(host) = self.find_host(uuid)? else {
            debug!("Block {} has no referencing entity, skipping", uuid);
            return Ok(());
        };
        debug!("Loading detached block {} hosted by {}", uuid, host);
        self.walk(host, *uuid)
    }

    fn find_host(&self, uuid: &EntityUuid) -> EngineResult<Option<Host>> {
        let host_in = |entity: &Entity| {
            entity
                .block_fields()
                .find(|field| field.references().contains(uuid))
                .map(|field| Host::new(entity.entity_type(), entity.uuid(), field.id.clone()))
        };

        if let Some(host) = self.created.iter().find_map(host_in) {
            return Ok(Some(host));
        }
        let referencing = self
            .storage
            .query(&EntityQuery::new().referencing(*uuid))?;
        Ok(referencing.iter().find_map(host_in))
    }

    /// Position in the flattened order. `None` means "not in the working set".
    #[must_use]
    pub fn get_index(&self, uuid: &EntityUuid) -> Option<usize> {
        if !self.slots.contains_key(uuid) {
            return None;
        }
        self.iter().position(|proxy| proxy.uuid() == *uuid)
    }

    /// Resolves a selection to live uuids sorted by current index.
    ///
    /// Unknown and deleted uuids are dropped; duplicates collapse.
    pub fn selection(&mut self, uuids: &[EntityUuid]) -> EngineResult<Vec<EntityUuid>> {
        let mut wanted = HashSet::new();
        for uuid in uuids {
            match self.get_proxy(uuid)? {
                Some(proxy) if !proxy.is_deleted() => {
                    wanted.insert(*uuid);
                }
                _ => debug!("Skipping {}: not in the working set", uuid),
            }
        }
        Ok(self
            .iter()
            .map(BlockProxy::uuid)
            .filter(|uuid| wanted.contains(uuid))
            .collect())
    }

    /// Resolves a selection to live proxies sorted by current index, not by
    /// input order.
    pub fn get_proxies(&mut self, uuids: &[EntityUuid]) -> EngineResult<Vec<&BlockProxy>> {
        let selection = self.selection(uuids)?;
        let this: &Self = self;
        Ok(selection
            .iter()
            .filter_map(move |uuid| this.proxy(uuid))
            .collect())
    }

    /// Live proxies hosted by any field of the given entity, in list order.
    #[must_use]
    pub fn proxies_for_host(
        &self,
        entity_type: EntityType,
        entity_uuid: &EntityUuid,
    ) -> Vec<&BlockProxy> {
        self.iter()
            .filter(|proxy| !proxy.is_deleted() && proxy.host().is_entity(entity_type, entity_uuid))
            .collect()
    }

    /// Checks that blocks can be placed at `host`.
    ///
    /// Returns false when the host entity is unknown or is a block that is no
    /// longer live. A field the host does not declare, or declares with a
    /// kind other than block references, is an error.
    pub fn resolve_host(&mut self, host: &Host) -> EngineResult<bool> {
        if host.entity_type == EntityType::Block {
            if self.get_proxy(&host.entity_uuid)?.is_none() || !self.is_live(&host.entity_uuid) {
                debug!("Host block {} is not in the working set", host.entity_uuid);
                return Ok(false);
            }
            if let Some(proxy) = self.proxy(&host.entity_uuid) {
                Self::check_block_field(proxy.block().entity(), &host.field)?;
            }
            return Ok(true);
        }

        let Some(entity) = self.entity(host.entity_type, &host.entity_uuid)? else {
            debug!("Host {} does not exist", host);
            return Ok(false);
        };
        Self::check_block_field(&entity, &host.field)?;
        Ok(true)
    }

    fn check_block_field(entity: &Entity, id: &str) -> EngineResult<()> {
        let field = entity.get(id)?;
        if !field.kind.is_blocks() {
            return Err(ModelError::FieldKindMismatch {
                field: field.id.clone(),
                expected: FieldKind::Blocks,
                found: format!("{:?} field", field.kind),
            }
            .into());
        }
        Ok(())
    }

    // ── Ordering ──

    /// Inserts a proxy immediately after `after`.
    ///
    /// A missing or unresolvable anchor inserts at the front. A proxy whose
    /// uuid is already present replaces the old one and takes the new
    /// position.
    pub fn add_proxy(&mut self, proxy: BlockProxy, after: Option<EntityUuid>) {
        let uuid = proxy.uuid();
        if self.slots.contains_key(&uuid) {
            self.unlink(&uuid);
        }
        self.slots.insert(
            uuid,
            Slot {
                proxy,
                prev: None,
                next: None,
            },
        );
        self.link_after(uuid, after);
    }

    /// Moves a proxy to immediately after `after` (front when `None` or
    /// unresolvable). Returns false if the proxy is not in the working set.
    pub fn move_proxy_after(&mut self, uuid: &EntityUuid, after: Option<EntityUuid>) -> bool {
        if !self.slots.contains_key(uuid) {
            return false;
        }
        if after == Some(*uuid) {
            return true;
        }
        self.unlink(uuid);
        self.link_after(*uuid, after);
        true
    }

    fn push_back(&mut self, proxy: BlockProxy) {
        let tail = self.tail;
        let uuid = proxy.uuid();
        self.slots.insert(
            uuid,
            Slot {
                proxy,
                prev: None,
                next: None,
            },
        );
        self.link_after(uuid, tail);
    }

    fn unlink(&mut self, uuid: &EntityUuid) {
        let Some(slot) = self.slots.get_mut(uuid) else {
            return;
        };
        let (prev, next) = (slot.prev.take(), slot.next.take());

        match prev {
            Some(prev) => {
                if let Some(slot) = self.slots.get_mut(&prev) {
                    slot.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(next) => {
                if let Some(slot) = self.slots.get_mut(&next) {
                    slot.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Links an unlinked slot after `anchor`, or at the front.
    fn link_after(&mut self, uuid: EntityUuid, anchor: Option<EntityUuid>) {
        let anchor = anchor.filter(|a| *a != uuid && self.slots.contains_key(a));

        let (prev, next) = match anchor {
            Some(anchor) => (Some(anchor), self.slots.get(&anchor).and_then(|s| s.next)),
            None => (None, self.head),
        };

        if let Some(slot) = self.slots.get_mut(&uuid) {
            slot.prev = prev;
            slot.next = next;
        }
        match prev {
            Some(prev) => {
                if let Some(slot) = self.slots.get_mut(&prev) {
                    slot.next = Some(uuid);
                }
            }
            None => self.head = Some(uuid),
        }
        match next {
            Some(next) => {
                if let Some(slot) = self.slots.get_mut(&next) {
                    slot.prev = Some(uuid);
                }
            }
            None => self.tail = Some(uuid),
        }
    }

    // ── Liveness ──

    /// A proxy is live when it is not deleted and its host is either a
    /// non-block entity, the root, or itself a live block.
    #[must_use]
    pub fn is_live(&self, uuid: &EntityUuid) -> bool {
        let mut visiting = HashSet::new();
        let mut current = *uuid;
        loop {
            if !visiting.insert(current) {
                return false;
            }
            let Some(proxy) = self.proxy(&current) else {
                return false;
            };
            if proxy.is_deleted() {
                return false;
            }
            let host = proxy.host();
            if host.entity_type != EntityType::Block || host.entity_uuid == self.root.uuid() {
                return true;
            }
            current = host.entity_uuid;
        }
    }

    /// Returns true if `uuid` is `ancestor` or is hosted somewhere below it.
    #[must_use]
    pub fn is_within(&self, uuid: &EntityUuid, ancestor: &EntityUuid) -> bool {
        let mut visiting = HashSet::new();
        let mut current = *uuid;
        loop {
            if current == *ancestor {
                return true;
            }
            if !visiting.insert(current) {
                return false;
            }
            match self.proxy(&current).map(BlockProxy::host) {
                Some(host) if host.entity_type == EntityType::Block => {
                    current = host.entity_uuid;
                }
                _ => return false,
            }
        }
    }

    // ── Session entities ──

    /// Creates a fresh, unsaved block through the storage collaborator.
    #[must_use]
    pub fn create_block(&self, bundle: Bundle, uuid: EntityUuid) -> Block {
        self.storage.create(bundle, uuid)
    }

    /// Registers a non-block entity created during the session, replacing an
    /// earlier one with the same identity.
    pub fn create_entity(&mut self, entity: Entity) {
        self.created.retain(|e| {
            !(e.entity_type() == entity.entity_type() && e.uuid() == entity.uuid())
        });
        self.created.push(entity);
    }

    /// Non-block entities created during the session.
    #[must_use]
    pub fn created_entities(&self) -> &[Entity] {
        &self.created
    }

    /// Looks up a non-block entity: session entities first, then the root,
    /// then storage.
    pub fn entity(
        &self,
        entity_type: EntityType,
        uuid: &EntityUuid,
    ) -> EngineResult<Option<Entity>> {
        if let Some(entity) = self
            .created
            .iter()
            .find(|e| e.entity_type() == entity_type && e.uuid() == *uuid)
        {
            return Ok(Some(entity.clone()));
        }
        if self.root.entity_type() == entity_type && self.root.uuid() == *uuid {
            return Ok(Some(self.root.clone()));
        }
        Ok(self.storage.load(entity_type, uuid)?)
    }
}

/// Iterator over proxies in flattened order.
pub struct Proxies<'c, 'a> {
    context: &'c MutationContext<'a>,
    cursor: Option<EntityUuid>,
}

impl<'c> Iterator for Proxies<'c, '_> {
    type Item = &'c BlockProxy;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.context.slots.get(&self.cursor?)?;
        self.cursor = slot.next;
        Some(&slot.proxy)
    }
}
