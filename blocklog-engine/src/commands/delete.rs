use crate::{EngineResult, MutationContext};
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Soft-deletes blocks. Deleted proxies stay in the order so later anchors
/// still resolve; they are filtered out when materializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteArgs {
    pub uuids: Vec<EntityUuid>,
}

impl DeleteArgs {
    pub(crate) fn execute(&self, context: &mut MutationContext<'_>) -> EngineResult<()> {
        for uuid in &self.uuids {
            match context.get_proxy(uuid)? {
                Some(proxy) => proxy.mark_deleted(),
                None => debug!("Skipping delete of {}: not in the working set", uuid),
            }
        }
        Ok(())
    }
}
