//! Block proxies: per-replay wrappers carrying placement and overrides.

use blocklog_model::{Block, Bundle, CONTENT_FIELD};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a block is placed: the `(entity_type, entity_uuid, field)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Host {
    pub entity_type: EntityType,
    pub entity_uuid: EntityUuid,
    pub field: String,
}

impl Host {
    /// Creates a host triple.
    pub fn new(entity_type: EntityType, entity_uuid: EntityUuid, field: impl Into<String>) -> Self {
        Self {
            entity_type,
            entity_uuid,
            field: field.into(),
        }
    }

    /// The `content` field of a content page.
    pub fn content(page: EntityUuid) -> Self {
        Self::new(EntityType::Content, page, CONTENT_FIELD)
    }

    /// A block list field of another block.
    pub fn block(parent: EntityUuid, field: impl Into<String>) -> Self {
        Self::new(EntityType::Block, parent, field)
    }

    /// Returns true if this host is any field of the given entity.
    #[must_use]
    pub fn is_entity(&self, entity_type: EntityType, entity_uuid: &EntityUuid) -> bool {
        self.entity_type == entity_type && self.entity_uuid == *entity_uuid
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.entity_type, self.entity_uuid, self.field)
    }
}

/// A mutable, position-aware wrapper around a block, alive for one replay.
///
/// Option overrides stay on the proxy; they reach the block's persisted
/// options only in the save pass.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockProxy {
    block: Block,
    host: Host,
    deleted: bool,
    override_options: BTreeMap<String, String>,
}

impl BlockProxy {
    /// Wraps a block placed at `host`.
    pub fn new(block: Block, host: Host) -> Self {
        Self {
            block,
            host,
            deleted: false,
            override_options: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn uuid(&self) -> EntityUuid {
        self.block.uuid()
    }

    #[must_use]
    pub fn bundle(&self) -> Bundle {
        self.block.bundle()
    }

    #[must_use]
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    #[must_use]
    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn set_host(&mut self, host: Host) {
        self.host = host;
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    #[must_use]
    pub fn override_options(&self) -> &BTreeMap<String, String> {
        &self.override_options
    }

    /// Sets a single option override.
    pub fn set_override(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.override_options.insert(key.into(), value.into());
    }

    /// Merges several overrides at once; later keys win.
    pub fn extend_overrides(&mut self, options: BTreeMap<String, String>) {
        self.override_options.extend(options);
    }

    /// Persisted options with overrides applied on top.
    #[must_use]
    pub fn options(&self) -> BTreeMap<String, String> {
        let mut options = self.block.options();
        options.extend(
            self.override_options
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        options
    }
}
