//! The edit state: mutation log plus cursor.
//!
//! Every materialization replays the log from scratch against a fresh
//! [`MutationContext`] built from storage. Nothing is cached between calls;
//! any cursor position is just "replay up to there".

use crate::materialize::materialize;
use crate::save::SavePlan;
use crate::{
    EngineConfig, EngineError, EngineResult, HistoryItem, HistoryMetadata, MaterializedState,
    Mutation, MutationContext, MutationRecord,
};
use blocklog_model::Entity;
use blocklog_storage::EntityStorage;
use blocklog_types::{EntityUuid, LogTimestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Serializes the cursor as a signed index where `-1` is the original state.
mod cursor {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(index: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(i) => serializer.serialize_i64(*i as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let index = i64::deserialize(deserializer)?;
        Ok(usize::try_from(index).ok())
    }

    pub fn origin() -> Option<usize> {
        None
    }
}

/// The log of committed mutations for one edited entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditState {
    uuid: EntityUuid,
    #[serde(default)]
    mutations: Vec<MutationRecord>,
    #[serde(default = "cursor::origin", with = "cursor")]
    current_index: Option<usize>,
}

impl EditState {
    /// Creates an empty log for the entity `uuid`.
    #[must_use]
    pub fn new(uuid: EntityUuid) -> Self {
        Self {
            uuid,
            mutations: Vec::new(),
            current_index: None,
        }
    }

    /// The uuid of the edited root entity.
    #[must_use]
    pub fn uuid(&self) -> EntityUuid {
        self.uuid
    }

    #[must_use]
    pub fn mutations(&self) -> &[MutationRecord] {
        &self.mutations
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// The cursor, `-1` at the original state.
    #[must_use]
    pub fn current_index(&self) -> isize {
        self.current_index.map_or(-1, |i| i as isize)
    }

    /// The cursor as a position; `None` at the original state.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.current_index
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.current_index.is_some()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.current_index.map_or(0, |i| i + 1) < self.mutations.len()
    }

    // ── Cursor ──

    /// Appends a mutation and moves the cursor onto it.
    ///
    /// When the cursor is behind the tip, the mutations after it are
    /// discarded first and can no longer be redone.
    pub fn commit(&mut self, mutation: Mutation) -> usize {
        let keep = self.current_index.map_or(0, |i| i + 1);
        if keep < self.mutations.len() {
            info!(
                "Discarding {} mutation(s) after index {} of {}",
                self.mutations.len() - keep,
                self.current_index(),
                self.uuid
            );
            self.mutations.truncate(keep);
        }

        let timestamp = self
            .mutations
            .last()
            .map_or_else(LogTimestamp::now, |record| record.timestamp.tick());
        debug!("Committing {} to {}", mutation.id(), self.uuid);
        self.mutations.push(MutationRecord::new(mutation, timestamp));

        let index = self.mutations.len() - 1;
        self.current_index = Some(index);
        index
    }

    /// Appends a mutation only if the log still replays with it.
    ///
    /// The new record is replayed once, which also fixes its generated uuids.
    /// On error the log, the discarded redo branch and the cursor are
    /// restored and the error is returned.
    pub fn commit_checked(
        &mut self,
        mutation: Mutation,
        storage: &dyn EntityStorage,
        root: Entity,
        config: &EngineConfig,
    ) -> EngineResult<usize> {
        let cursor = self.current_index;
        let branch = self.mutations.split_off(cursor.map_or(0, |i| i + 1));
        let id = mutation.id();
        let index = self.commit(mutation);

        match self.replay(storage, root, config, Some(index)) {
            Ok(_) => {
                if !branch.is_empty() {
                    info!(
                        "Discarded {} mutation(s) after index {} of {}",
                        branch.len(),
                        cursor.map_or(-1, |i| i as isize),
                        self.uuid
                    );
                }
                Ok(index)
            }
            Err(err) => {
                warn!("Rejected {} for {}: {}", id, self.uuid, err);
                self.mutations.truncate(index);
                self.mutations.extend(branch);
                self.current_index = cursor;
                Err(err)
            }
        }
    }

    /// Steps the cursor back. Returns false at the original state.
    pub fn undo(&mut self) -> bool {
        match self.current_index {
            Some(i) => {
                self.current_index = i.checked_sub(1);
                true
            }
            None => false,
        }
    }

    /// Steps the cursor forward. Returns false at the tip.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.current_index = Some(self.current_index.map_or(0, |i| i + 1));
        true
    }

    /// Moves the cursor, clamped to `[-1, len - 1]`.
    pub fn set_index(&mut self, index: isize) {
        self.current_index = self.clamp(index);
    }

    fn clamp(&self, index: isize) -> Option<usize> {
        let last = self.mutations.len().checked_sub(1)?;
        usize::try_from(index).ok().map(|i| i.min(last))
    }

    // ── Replay ──

    /// Replays `mutations[0..=index]` against a fresh context built from
    /// `root`, writing each command's configuration back onto its record.
    pub fn replay<'a>(
        &mut self,
        storage: &'a dyn EntityStorage,
        root: Entity,
        config: &'a EngineConfig,
        index: Option<usize>,
    ) -> EngineResult<MutationContext<'a>> {
        if root.uuid() != self.uuid {
            return Err(EngineError::RootMismatch {
                expected: self.uuid,
                found: root.uuid(),
            });
        }

        let mut context = MutationContext::new(storage, root, config)?;
        let end = match index {
            Some(i) => (i + 1).min(self.mutations.len()),
            None => 0,
        };
        for (i, record) in self.mutations[..end].iter_mut().enumerate() {
            debug!("Replaying #{} {}", i, record.mutation.id());
            record
                .mutation
                .execute(&mut context, &mut record.configuration)?;
        }
        Ok(context)
    }

    /// Materializes the document at the cursor.
    pub fn materialize(
        &mut self,
        storage: &dyn EntityStorage,
        root: Entity,
        config: &EngineConfig,
    ) -> EngineResult<MaterializedState> {
        let index = self.current_index;
        let context = self.replay(storage, root, config, index)?;
        Ok(materialize(&context))
    }

    /// Materializes the document at `index` (clamped) without moving the
    /// cursor.
    pub fn materialize_at(
        &mut self,
        storage: &dyn EntityStorage,
        root: Entity,
        config: &EngineConfig,
        index: isize,
    ) -> EngineResult<MaterializedState> {
        let index = self.clamp(index);
        let context = self.replay(storage, root, config, index)?;
        Ok(materialize(&context))
    }

    /// Replays to the cursor and persists the result, then clears the log so
    /// the saved storage becomes the new original state.
    ///
    /// Returns the state that was saved.
    pub fn save(
        &mut self,
        storage: &mut dyn EntityStorage,
        root: Entity,
        config: &EngineConfig,
    ) -> EngineResult<MaterializedState> {
        let index = self.current_index;
        let (state, plan) = {
            let context = self.replay(&*storage, root, config, index)?;
            (materialize(&context), SavePlan::from_context(&context)?)
        };

        let (stored, deleted) = plan.apply(storage)?;
        info!(
            "Saved {}: {} entities stored, {} deleted, {} mutation(s) folded",
            self.uuid,
            stored,
            deleted,
            self.current_index.map_or(0, |i| i + 1)
        );

        self.mutations.clear();
        self.current_index = None;
        Ok(state)
    }

    // ── Output ──

    /// The undo/redo list.
    #[must_use]
    pub fn history(&self) -> HistoryMetadata {
        HistoryMetadata {
            current_index: self.current_index(),
            mutations: self
                .mutations
                .iter()
                .map(|record| HistoryItem {
                    plugin_id: record.id().to_string(),
                    timestamp: record.timestamp,
                    affected_uuid: record.affected_uuid(),
                })
                .collect(),
        }
    }

    /// Serializes the log and cursor.
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a log, clamping an out-of-range cursor.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let mut state: Self = serde_json::from_str(json)?;
        state.current_index = state.clamp(state.current_index());
        Ok(state)
    }
}
