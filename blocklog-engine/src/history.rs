use blocklog_types::{EntityUuid, LogTimestamp};
use serde::{Deserialize, Serialize};

/// One entry of the undo/redo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub plugin_id: String,
    pub timestamp: LogTimestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_uuid: Option<EntityUuid>,
}

/// What a host needs to render an undo/redo list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMetadata {
    /// `-1` when at the original state.
    pub current_index: isize,
    pub mutations: Vec<HistoryItem>,
}
