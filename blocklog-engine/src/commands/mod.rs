//! The closed set of mutation commands.
//!
//! Every command is a [`Mutation`] variant carrying its own argument struct.
//! Commands describe intent: an argument naming a block that is no longer in
//! the working set is skipped, never an error.

mod add;
mod convert;
mod delete;
mod duplicate;
mod edit;
mod movement;
mod options;
mod reusable;
mod transform;

pub use add::{AddArgs, AddReusableArgs};
pub use convert::ConvertArgs;
pub use delete::DeleteArgs;
pub use duplicate::DuplicateArgs;
pub use edit::EditFieldValueArgs;
pub use movement::MoveArgs;
pub use options::{OptionUpdate, UpdateOptionsArgs};
pub use reusable::{DetachReusableArgs, MakeReusableArgs};
pub use transform::{TransformArgs, Transformer};

use crate::{BlockProxy, Configuration, EngineResult, Host, MutationContext};
use blocklog_model::{Bundle, FieldItem};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A mutation intent, persisted as `{"id": ..., "args": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", content = "args", rename_all = "snake_case")]
pub enum Mutation {
    Add(AddArgs),
    AddReusable(AddReusableArgs),
    Move(MoveArgs),
    Delete(DeleteArgs),
    Duplicate(DuplicateArgs),
    UpdateOptions(UpdateOptionsArgs),
    MakeReusable(MakeReusableArgs),
    DetachReusable(DetachReusableArgs),
    Convert(ConvertArgs),
    Transform(TransformArgs),
    EditFieldValue(EditFieldValueArgs),
}

impl Mutation {
    /// The stable command id persisted in the log.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::AddReusable(_) => "add_reusable",
            Self::Move(_) => "move",
            Self::Delete(_) => "delete",
            Self::Duplicate(_) => "duplicate",
            Self::UpdateOptions(_) => "update_options",
            Self::MakeReusable(_) => "make_reusable",
            Self::DetachReusable(_) => "detach_reusable",
            Self::Convert(_) => "convert",
            Self::Transform(_) => "transform",
            Self::EditFieldValue(_) => "edit_field_value",
        }
    }

    /// Applies the command to the working set.
    ///
    /// `configuration` is the record's uuid memo; commands that create
    /// entities draw their uuids from it.
    pub fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        match self {
            Self::Add(args) => args.execute(context, configuration),
            Self::AddReusable(args) => args.execute(context, configuration),
            Self::Move(args) => args.execute(context),
            Self::Delete(args) => args.execute(context),
            Self::Duplicate(args) => args.execute(context, configuration),
            Self::UpdateOptions(args) => args.execute(context),
            Self::MakeReusable(args) => args.execute(context, configuration),
            Self::DetachReusable(args) => args.execute(context, configuration),
            Self::Convert(args) => args.execute(context, configuration),
            Self::Transform(args) => args.execute(context, configuration),
            Self::EditFieldValue(args) => args.execute(context),
        }
    }

    /// The first block the mutation touches. Creating commands report the
    /// generated uuid once the record has been replayed.
    #[must_use]
    pub fn affected_uuid(&self, configuration: &Configuration) -> Option<EntityUuid> {
        match self {
            Self::Add(_) | Self::AddReusable(_) => configuration.get(Configuration::DEFAULT_SLOT),
            Self::Move(MoveArgs { uuids, .. })
            | Self::Delete(DeleteArgs { uuids })
            | Self::Duplicate(DuplicateArgs { uuids })
            | Self::DetachReusable(DetachReusableArgs { uuids })
            | Self::Convert(ConvertArgs { uuids, .. })
            | Self::Transform(TransformArgs { uuids, .. }) => uuids.first().copied(),
            Self::UpdateOptions(args) => args.options.first().map(|o| o.uuid),
            Self::MakeReusable(args) => Some(args.uuid),
            Self::EditFieldValue(args) => Some(args.uuid),
        }
    }

    // ── Constructors ──

    /// `add` at the front of `host`, or after `after`.
    pub fn add(bundle: Bundle, host: Host, after: Option<EntityUuid>) -> Self {
        Self::Add(AddArgs {
            bundle,
            values: BTreeMap::new(),
            host,
            after,
        })
    }

    /// `add` with initial field values.
    pub fn add_with_values(
        bundle: Bundle,
        values: BTreeMap<String, Vec<FieldItem>>,
        host: Host,
        after: Option<EntityUuid>,
    ) -> Self {
        Self::Add(AddArgs {
            bundle,
            values,
            host,
            after,
        })
    }

    pub fn add_reusable(library_item: EntityUuid, host: Host, after: Option<EntityUuid>) -> Self {
        Self::AddReusable(AddReusableArgs {
            library_item,
            host,
            after,
        })
    }

    pub fn move_to(uuids: Vec<EntityUuid>, host: Host, after: Option<EntityUuid>) -> Self {
        Self::Move(MoveArgs { uuids, host, after })
    }

    pub fn delete(uuids: Vec<EntityUuid>) -> Self {
        Self::Delete(DeleteArgs { uuids })
    }

    pub fn duplicate(uuids: Vec<EntityUuid>) -> Self {
        Self::Duplicate(DuplicateArgs { uuids })
    }

    /// `update_options` for a single key.
    pub fn set_option(uuid: EntityUuid, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UpdateOptions(UpdateOptionsArgs {
            options: vec![OptionUpdate {
                uuid,
                key: key.into(),
                value: value.into(),
            }],
        })
    }

    pub fn make_reusable(uuid: EntityUuid, label: impl Into<String>) -> Self {
        Self::MakeReusable(MakeReusableArgs {
            uuid,
            label: label.into(),
        })
    }

    pub fn detach_reusable(uuids: Vec<EntityUuid>) -> Self {
        Self::DetachReusable(DetachReusableArgs { uuids })
    }

    pub fn convert(uuids: Vec<EntityUuid>, bundle: Bundle) -> Self {
        Self::Convert(ConvertArgs { uuids, bundle })
    }

    pub fn transform(uuids: Vec<EntityUuid>, transformer: Transformer) -> Self {
        Self::Transform(TransformArgs { uuids, transformer })
    }

    pub fn edit_field_value(uuid: EntityUuid, field: impl Into<String>, value: Vec<FieldItem>) -> Self {
        Self::EditFieldValue(EditFieldValueArgs {
            uuid,
            field: field.into(),
            value,
        })
    }
}

/// Clones a block and, recursively, every live block it hosts.
///
/// The clone is placed at `host` after `after`; its descendants follow it in
/// the flattened order. Uuids come from `slot` for the clone and
/// `"{slot}/{child}"` for descendants. Returns the clone's uuid and the uuid
/// of the last inserted proxy, or `None` if `source` is not in the working set.
pub(crate) fn clone_tree(
    context: &mut MutationContext<'_>,
    configuration: &mut Configuration,
    source: &EntityUuid,
    host: Host,
    after: Option<EntityUuid>,
    slot: &str,
) -> EngineResult<Option<(EntityUuid, EntityUuid)>> {
    let Some(proxy) = context.proxy(source) else {
        return Ok(None);
    };

    let uuid = configuration.uuid(slot);
    let mut clone = BlockProxy::new(proxy.block().clone_with_uuid(uuid), host);
    clone.extend_overrides(proxy.override_options().clone());

    let children: Vec<(EntityUuid, String)> = context
        .proxies_for_host(EntityType::Block, source)
        .into_iter()
        .map(|child| (child.uuid(), child.host().field.clone()))
        .collect();

    context.add_proxy(clone, after);

    let mut last = uuid;
    for (child, field) in children {
        let child_slot = format!("{slot}/{child}");
        if let Some((_, child_last)) = clone_tree(
            context,
            configuration,
            &child,
            Host::block(uuid, field),
            Some(last),
            &child_slot,
        )? {
            last = child_last;
        }
    }
    Ok(Some((uuid, last)))
}
