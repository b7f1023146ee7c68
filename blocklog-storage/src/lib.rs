//! Entity storage for blocklog.
//!
//! Defines the storage collaborator the mutation engine reads its ground
//! truth from, and an in-memory implementation.
//!
//! # Architecture
//!
//! - [`EntityStorage`] — load, query, create, store and delete entities
//! - [`EntityQuery`] — conditions for `query`
//! - [`MemoryStorage`] — `BTreeMap`-backed store with JSON snapshot files,
//!   used by tests and the CLI

mod error;
mod memory;
mod query;
mod store;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStorage;
pub use query::EntityQuery;
pub use store::EntityStorage;
