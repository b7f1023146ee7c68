use crate::{BlockProxy, Configuration, EngineResult, MutationContext};
use blocklog_model::Bundle;
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Replaces each selected block with a new block of another bundle.
///
/// The main text and the options carry over; the old block is deleted and
/// the new one takes its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertArgs {
    pub uuids: Vec<EntityUuid>,
    pub bundle: Bundle,
}

impl ConvertArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        for uuid in context.selection(&self.uuids)? {
            let Some(old) = context.proxy(&uuid) else {
                continue;
            };
            if old.bundle() == self.bundle {
                debug!("Skipping convert of {}: already {}", uuid, self.bundle);
                continue;
            }
            let host = old.host().clone();
            let text = old.block().text().map(str::to_string);
            let mut options = self.bundle.default_options();
            options.extend(old.options());

            let new_uuid = configuration.uuid(&uuid.to_string());
            let mut block = context.create_block(self.bundle, new_uuid);
            block.set_options(options);
            if let (Some(text), Some(_)) = (text, self.bundle.text_field()) {
                block.set_text(text)?;
            }

            context.add_proxy(BlockProxy::new(block, host), Some(uuid));
            if let Some(old) = context.proxy_mut(&uuid) {
                old.mark_deleted();
            }
            debug!("Converted {} to {} block {}", uuid, self.bundle, new_uuid);
        }
        Ok(())
    }
}
