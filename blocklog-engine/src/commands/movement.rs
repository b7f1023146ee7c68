use crate::{EngineResult, Host, MutationContext};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Re-homes a selection to `host`, landing contiguously after `after` in the
/// selection's original relative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveArgs {
    pub uuids: Vec<EntityUuid>,
    pub host: Host,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<EntityUuid>,
}

impl MoveArgs {
    pub(crate) fn execute(&self, context: &mut MutationContext<'_>) -> EngineResult<()> {
        if !context.resolve_host(&self.host)? {
            debug!("Host {} not found, skipping move", self.host);
            return Ok(());
        }
        let selection = context.selection(&self.uuids)?;

        let mut anchor = self.after;
        for uuid in selection {
            // A block cannot be hosted by itself or one of its descendants.
            if self.host.entity_type == EntityType::Block
                && context.is_within(&self.host.entity_uuid, &uuid)
            {
                debug!("Skipping move of {} into its own subtree", uuid);
                continue;
            }

            if let Some(proxy) = context.proxy_mut(&uuid) {
                proxy.set_host(self.host.clone());
            }
            context.move_proxy_after(&uuid, anchor);
            anchor = Some(uuid);
        }
        Ok(())
    }
}
