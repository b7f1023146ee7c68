use crate::{EngineResult, MutationContext};
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One option override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionUpdate {
    pub uuid: EntityUuid,
    pub key: String,
    pub value: String,
}

/// Sets option overrides on proxies. Persisted options change only on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptionsArgs {
    pub options: Vec<OptionUpdate>,
}

impl UpdateOptionsArgs {
    pub(crate) fn execute(&self, context: &mut MutationContext<'_>) -> EngineResult<()> {
        for update in &self.options {
            match context.get_proxy(&update.uuid)? {
                Some(proxy) if !proxy.is_deleted() => {
                    proxy.set_override(update.key.clone(), update.value.clone());
                }
                _ => debug!("Skipping option update on {}", update.uuid),
            }
        }
        Ok(())
    }
}
