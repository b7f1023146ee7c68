//! Mutation log engine for blocklog.
//!
//! Edits to a tree of content blocks are recorded as an ordered, replayable
//! log of [`Mutation`]s. Any position in the log can be materialized by
//! replaying the log from scratch against the stored document:
//!
//! - [`EditState`] — the log plus cursor; commit, undo, redo, replay, save
//! - [`MutationContext`] — the working set of [`BlockProxy`]s for one replay
//! - [`Mutation`] — the closed set of commands and their arguments
//! - [`Configuration`] — per-record memo keeping generated uuids stable
//! - [`MaterializedState`] — per-field lists, merged options and violations
//!
//! Replay is a synchronous fold with no I/O of its own: storage is read
//! through the [`EntityStorage`](blocklog_storage::EntityStorage) handle
//! passed in, and written only by [`EditState::save`].

mod commands;
mod config;
mod configuration;
mod context;
mod error;
mod history;
mod materialize;
mod proxy;
mod record;
mod save;
mod state;

pub use commands::{
    AddArgs, AddReusableArgs, ConvertArgs, DeleteArgs, DetachReusableArgs, DuplicateArgs,
    EditFieldValueArgs, MakeReusableArgs, MoveArgs, Mutation, OptionUpdate, TransformArgs,
    Transformer, UpdateOptionsArgs,
};
pub use config::EngineConfig;
pub use configuration::Configuration;
pub use context::{MutationContext, Proxies};
pub use error::{EngineError, EngineResult};
pub use history::{HistoryItem, HistoryMetadata};
pub use materialize::{FieldListItem, MaterializedState, MutatedField, Violation};
pub use proxy::{BlockProxy, Host};
pub use record::MutationRecord;
pub use state::EditState;
