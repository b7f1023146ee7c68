use crate::{BlockProxy, Configuration, EngineResult, Host, MutationContext};
use blocklog_model::{Bundle, FieldItem};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Creates a new block and places it after `after` (front when absent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddArgs {
    pub bundle: Bundle,
    /// Initial values; bundle defaults apply to fields not listed.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, Vec<FieldItem>>,
    pub host: Host,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<EntityUuid>,
}

impl AddArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        if !context.resolve_host(&self.host)? {
            debug!("Host {} not found, skipping add", self.host);
            return Ok(());
        }

        let uuid = configuration.default_uuid();
        let mut block = context.create_block(self.bundle, uuid);
        if !self.values.is_empty() {
            block.entity_mut().set_values(self.values.clone())?;
        }

        debug!("Adding {} block {} to {}", self.bundle, uuid, self.host);
        context.add_proxy(BlockProxy::new(block, self.host.clone()), self.after);
        Ok(())
    }
}

/// Places a new `from_library` block referencing an existing library item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddReusableArgs {
    pub library_item: EntityUuid,
    pub host: Host,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<EntityUuid>,
}

impl AddReusableArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        if context
            .entity(EntityType::LibraryItem, &self.library_item)?
            .is_none()
        {
            debug!("Library item {} not found, skipping add", self.library_item);
            return Ok(());
        }
        if !context.resolve_host(&self.host)? {
            debug!("Host {} not found, skipping add", self.host);
            return Ok(());
        }

        let uuid = configuration.default_uuid();
        let mut block = context.create_block(Bundle::FromLibrary, uuid);
        block
            .entity_mut()
            .set_field("library_item", vec![FieldItem::Reference(self.library_item)])?;

        debug!(
            "Adding reusable block {} for library item {}",
            uuid, self.library_item
        );
        context.add_proxy(BlockProxy::new(block, self.host.clone()), self.after);
        Ok(())
    }
}
