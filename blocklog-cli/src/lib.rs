//! Command implementations for the `blocklog` binary.
//!
//! Every command loads the entity store and the edit log from their JSON
//! files, acts, and writes back whatever changed. Commands return their
//! output as a string so they can be tested without a terminal.

use anyhow::{anyhow, bail, Context, Result};
use blocklog_engine::{EditState, EngineConfig, Mutation};
use blocklog_model::Entity;
use blocklog_storage::{EntityQuery, EntityStorage, MemoryStorage};
use blocklog_types::{EntityType, EntityUuid};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "blocklog")]
#[command(about = "Inspect and drive a blocklog edit log")]
pub struct Cli {
    /// Path to the JSON entity store
    #[arg(long, default_value = "store.json")]
    pub store: PathBuf,

    /// Path to the JSON edit log
    #[arg(long, default_value = "state.json")]
    pub state: PathBuf,

    /// Path to the engine config (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty log for a root entity
    Init {
        /// Root entity; defaults to the first content entity in the store
        #[arg(long)]
        root: Option<EntityUuid>,
    },
    /// Append a mutation given as JSON
    Commit { mutation: String },
    /// Step the cursor back
    Undo,
    /// Step the cursor forward
    Redo,
    /// Move the cursor (clamped; -1 is the original state)
    Seek {
        #[arg(allow_negative_numbers = true)]
        index: isize,
    },
    /// Print the materialized document
    Show {
        /// Materialize this index instead of the cursor
        #[arg(long, allow_negative_numbers = true)]
        index: Option<isize>,
    },
    /// Print the undo/redo list
    History,
    /// Persist the document into the store and clear the log
    Save,
}

/// Runs a parsed command line and returns what to print.
pub fn run(cli: Cli) -> Result<String> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::default(),
    };
    let mut storage = MemoryStorage::open_json(&cli.store)
        .with_context(|| format!("Failed to open store {:?}", cli.store))?;

    let mut state = match cli.command {
        Command::Init { root } => return init(&storage, &cli.state, root),
        _ => read_state(&cli.state)?,
    };
    let root = load_root(&storage, state.uuid())?;

    let output = match cli.command {
        Command::Init { .. } => bail!("init does not operate on an existing log"),
        Command::Commit { mutation } => {
            let mutation: Mutation =
                serde_json::from_str(&mutation).context("Failed to parse mutation")?;
            let id = mutation.id();
            let index = state
                .commit_checked(mutation, &storage, root, &config)
                .with_context(|| format!("Mutation {id} was rejected"))?;
            info!("Committed {} at index {}", id, index);
            format!("{index}")
        }
        Command::Undo => {
            if !state.undo() {
                warn!("Already at the original state");
            }
            format!("{}", state.current_index())
        }
        Command::Redo => {
            if !state.redo() {
                warn!("Already at the latest mutation");
            }
            format!("{}", state.current_index())
        }
        Command::Seek { index } => {
            state.set_index(index);
            format!("{}", state.current_index())
        }
        Command::Show { index } => {
            let materialized = match index {
                Some(index) => state.materialize_at(&storage, root, &config, index)?,
                None => state.materialize(&storage, root, &config)?,
            };
            serde_json::to_string_pretty(&materialized)?
        }
        Command::History => serde_json::to_string_pretty(&state.history())?,
        Command::Save => {
            let saved = state.save(&mut storage, root, &config)?;
            storage
                .write_json(&cli.store)
                .with_context(|| format!("Failed to write store {:?}", cli.store))?;
            serde_json::to_string_pretty(&saved)?
        }
    };

    write_state(&cli.state, &state)?;
    Ok(output)
}

fn init(storage: &MemoryStorage, path: &Path, root: Option<EntityUuid>) -> Result<String> {
    let root = match root {
        Some(uuid) => load_root(storage, uuid)?.uuid(),
        None => storage
            .query(&EntityQuery::new().of_type(EntityType::Content))?
            .first()
            .map(Entity::uuid)
            .ok_or_else(|| anyhow!("Store holds no content entity to edit"))?,
    };
    if path.exists() {
        warn!("Replacing existing edit log at {:?}", path);
    }

    let state = EditState::new(root);
    write_state(path, &state)?;
    info!("Initialized edit log for {}", root);
    Ok(root.to_string())
}

/// Finds the root entity by uuid, whatever its type.
fn load_root(storage: &MemoryStorage, uuid: EntityUuid) -> Result<Entity> {
    let mut matches = storage
        .query(&EntityQuery::new())?
        .into_iter()
        .filter(|e| e.uuid() == uuid);
    match (matches.next(), matches.next()) {
        (Some(entity), None) => Ok(entity),
        (None, _) => bail!("Root entity {} not found in store", uuid),
        (Some(_), Some(_)) => bail!("Root uuid {} is ambiguous across entity types", uuid),
    }
}

fn read_state(path: &Path) -> Result<EditState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edit log {path:?}; run `blocklog init` first"))?;
    EditState::from_json(&json).context("Failed to parse edit log")
}

fn write_state(path: &Path, state: &EditState) -> Result<()> {
    std::fs::write(path, state.to_json()?)
        .with_context(|| format!("Failed to write edit log {path:?}"))
}
