use super::clone_tree;
use crate::{BlockProxy, Configuration, EngineResult, Host, MutationContext};
use blocklog_model::{Bundle, Entity, FieldItem, LIBRARY_BLOCK_FIELD};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use tracing::debug;

const LIBRARY_ITEM_SLOT: &str = "library_item";
const FROM_LIBRARY_SLOT: &str = "from_library";

/// Field on a `from_library` block pointing at its library item.
const LIBRARY_ITEM_FIELD: &str = "library_item";

/// Turns a block into a library item and puts a `from_library` instance in
/// its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeReusableArgs {
    pub uuid: EntityUuid,
    pub label: String,
}

impl MakeReusableArgs {
    /// The original block moves under the new library item's `block` field,
    /// so it leaves the page but is still saved.
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        let Some(original) = context.get_proxy(&self.uuid)? else {
            debug!("Skipping make_reusable of {}: not in the working set", self.uuid);
            return Ok(());
        };
        if original.is_deleted() || original.bundle() == Bundle::FromLibrary {
            debug!("Skipping make_reusable of {}", self.uuid);
            return Ok(());
        }
        let host = original.host().clone();
        let options = original.options();

        let library_uuid = configuration.uuid(LIBRARY_ITEM_SLOT);
        let instance_uuid = configuration.uuid(FROM_LIBRARY_SLOT);

        context.create_entity(Entity::library_item(library_uuid, &self.label, self.uuid));

        let mut instance = context.create_block(Bundle::FromLibrary, instance_uuid);
        instance
            .entity_mut()
            .set_field(LIBRARY_ITEM_FIELD, vec![FieldItem::Reference(library_uuid)])?;
        instance.set_options(options);
        context.add_proxy(BlockProxy::new(instance, host), Some(self.uuid));

        if let Some(original) = context.proxy_mut(&self.uuid) {
            original.set_host(Host::new(
                EntityType::LibraryItem,
                library_uuid,
                LIBRARY_BLOCK_FIELD,
            ));
        }

        debug!(
            "Made {} reusable as library item {} (instance {})",
            self.uuid, library_uuid, instance_uuid
        );
        Ok(())
    }
}

/// Replaces `from_library` instances with independent copies of the
/// library item's block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachReusableArgs {
    pub uuids: Vec<EntityUuid>,
}

impl DetachReusableArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        for uuid in context.selection(&self.uuids)? {
            self.detach(context, configuration, uuid)?;
        }
        Ok(())
    }

    fn detach(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
        uuid: EntityUuid,
    ) -> EngineResult<()> {
        let Some(instance) = context.proxy(&uuid) else {
            return Ok(());
        };
        if instance.bundle() != Bundle::FromLibrary {
            debug!("Skipping detach of {}: not a library instance", uuid);
            return Ok(());
        }
        let host = instance.host().clone();
        let options = instance.options();
        let library_uuid = instance
            .block()
            .entity()
            .field(LIBRARY_ITEM_FIELD)
            .and_then(|f| f.references().first().copied());

        let Some(library_uuid) = library_uuid else {
            debug!("Library instance {} has no library item", uuid);
            return Ok(());
        };
        let Some(library_item) = context.entity(EntityType::LibraryItem, &library_uuid)? else {
            debug!("Library item {} not found", library_uuid);
            return Ok(());
        };
        let Some(source) = library_item
            .field(LIBRARY_BLOCK_FIELD)
            .and_then(|f| f.references().first().copied())
        else {
            debug!("Library item {} holds no block", library_uuid);
            return Ok(());
        };
        if context.get_proxy(&source)?.is_none() {
            debug!("Library block {} not found", source);
            return Ok(());
        }

        let Some((clone, _)) = clone_tree(
            context,
            configuration,
            &source,
            host,
            Some(uuid),
            &uuid.to_string(),
        )?
        else {
            return Ok(());
        };

        if let Some(proxy) = context.proxy_mut(&clone) {
            proxy.extend_overrides(options);
        }
        if let Some(proxy) = context.proxy_mut(&uuid) {
            proxy.mark_deleted();
        }
        debug!("Detached {} from library item {} as {}", uuid, library_uuid, clone);
        Ok(())
    }
}
