use crate::{EngineError, EngineResult, MutationContext};
use blocklog_model::FieldItem;
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Overwrites one field's list on a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditFieldValueArgs {
    pub uuid: EntityUuid,
    pub field: String,
    pub value: Vec<FieldItem>,
}

impl EditFieldValueArgs {
    /// An unknown field, a block-reference field or a value of the wrong
    /// kind is an error; a missing block is not.
    pub(crate) fn execute(&self, context: &mut MutationContext<'_>) -> EngineResult<()> {
        match context.get_proxy(&self.uuid)? {
            Some(proxy) if !proxy.is_deleted() => {
                if proxy.block().entity().get(&self.field)?.kind.is_blocks() {
                    return Err(EngineError::BlockField {
                        uuid: self.uuid,
                        field: self.field.clone(),
                    });
                }
                proxy
                    .block_mut()
                    .entity_mut()
                    .set_field(&self.field, self.value.clone())?;
            }
            _ => debug!("Skipping edit of {}.{}", self.uuid, self.field),
        }
        Ok(())
    }
}
