use crate::{Configuration, Mutation};
use blocklog_types::{EntityUuid, LogTimestamp};
use serde::{Deserialize, Serialize};

/// A committed mutation: `{ id, args, configuration, timestamp }`.
///
/// Immutable once committed except for `configuration`, which the command
/// fills on its first replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRecord {
    #[serde(flatten)]
    pub mutation: Mutation,
    #[serde(default)]
    pub configuration: Configuration,
    pub timestamp: LogTimestamp,
}

impl MutationRecord {
    /// Creates a record with an empty configuration.
    #[must_use]
    pub fn new(mutation: Mutation, timestamp: LogTimestamp) -> Self {
        Self {
            mutation,
            configuration: Configuration::new(),
            timestamp,
        }
    }

    /// The command id.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.mutation.id()
    }

    #[must_use]
    pub fn affected_uuid(&self) -> Option<EntityUuid> {
        self.mutation.affected_uuid(&self.configuration)
    }
}
