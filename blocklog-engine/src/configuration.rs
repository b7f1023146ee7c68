//! Per-record memo of generated identifiers.
//!
//! A command that creates an entity asks its configuration for the uuid of a
//! named slot. The first execution generates and stores it; every later replay
//! of the same record reads the stored value back, so identity never forks
//! across undo, redo or history scrubbing.

use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slot-keyed uuid memo stored on a [`MutationRecord`](crate::MutationRecord).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration(BTreeMap<String, EntityUuid>);

impl Configuration {
    /// Slot used by commands that create a single entity.
    pub const DEFAULT_SLOT: &'static str = "default";

    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the uuid for `slot`, generating it on first use.
    pub fn uuid(&mut self, slot: &str) -> EntityUuid {
        *self
            .0
            .entry(slot.to_string())
            .or_insert_with(EntityUuid::new)
    }

    /// Shorthand for the default slot.
    pub fn default_uuid(&mut self) -> EntityUuid {
        self.uuid(Self::DEFAULT_SLOT)
    }

    /// Reads a slot without generating.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<EntityUuid> {
        self.0.get(slot).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
