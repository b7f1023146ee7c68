use super::clone_tree;
use crate::{Configuration, EngineResult, MutationContext};
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};

/// Clones a selection together with the blocks nested in it.
///
/// The first clone lands after the lowest-index selected block; each further
/// clone follows the previous clone's subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateArgs {
    pub uuids: Vec<EntityUuid>,
}

impl DuplicateArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        let selection = context.selection(&self.uuids)?;

        let mut anchor = selection.first().copied();
        for uuid in selection {
            let Some(host) = context.proxy(&uuid).map(|p| p.host().clone()) else {
                continue;
            };
            if let Some((_, last)) = clone_tree(
                context,
                configuration,
                &uuid,
                host,
                anchor,
                &uuid.to_string(),
            )? {
                anchor = Some(last);
            }
        }
        Ok(())
    }
}
