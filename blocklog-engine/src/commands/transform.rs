use crate::{BlockProxy, Configuration, EngineResult, MutationContext};
use blocklog_types::EntityUuid;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How `transform` reshapes the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transformer {
    /// Concatenates the texts into the first block and deletes the rest.
    MergeText,
    /// Splits each block's text on the separator into consecutive blocks.
    SplitParagraphs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformArgs {
    pub uuids: Vec<EntityUuid>,
    pub transformer: Transformer,
}

impl TransformArgs {
    pub(crate) fn execute(
        &self,
        context: &mut MutationContext<'_>,
        configuration: &mut Configuration,
    ) -> EngineResult<()> {
        // Only blocks with a text field take part.
        let selection: Vec<EntityUuid> = context
            .selection(&self.uuids)?
            .into_iter()
            .filter(|uuid| {
                context
                    .proxy(uuid)
                    .is_some_and(|p| p.bundle().text_field().is_some())
            })
            .collect();

        match self.transformer {
            Transformer::MergeText => merge_text(context, &selection),
            Transformer::SplitParagraphs => split_paragraphs(context, configuration, &selection),
        }
    }
}

fn merge_text(context: &mut MutationContext<'_>, selection: &[EntityUuid]) -> EngineResult<()> {
    let [first, rest @ ..] = selection else {
        return Ok(());
    };
    if rest.is_empty() {
        debug!("Nothing to merge into {}", first);
        return Ok(());
    }

    let separator = context.config().merge_separator.as_str();
    let merged = selection
        .iter()
        .filter_map(|uuid| context.proxy(uuid)?.block().text())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator);

    if let Some(proxy) = context.proxy_mut(first) {
        proxy.block_mut().set_text(merged)?;
    }
    for uuid in rest {
        if let Some(proxy) = context.proxy_mut(uuid) {
            proxy.mark_deleted();
        }
    }
    debug!("Merged {} blocks into {}", rest.len() + 1, first);
    Ok(())
}

fn split_paragraphs(
    context: &mut MutationContext<'_>,
    configuration: &mut Configuration,
    selection: &[EntityUuid],
) -> EngineResult<()> {
    let separator = context.config().merge_separator.clone();

    for uuid in selection {
        let Some(proxy) = context.proxy(uuid) else {
            continue;
        };
        let parts: Vec<String> = proxy
            .block()
            .text()
            .unwrap_or_default()
            .split(separator.as_str())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        if parts.len() < 2 {
            continue;
        }

        let host = proxy.host().clone();
        let template = proxy.block().clone();
        let overrides = proxy.override_options().clone();

        let mut anchor = *uuid;
        for (i, part) in parts.iter().enumerate().skip(1) {
            let new_uuid = configuration.uuid(&format!("{uuid}:{i}"));
            let mut block = template.clone_with_uuid(new_uuid);
            block.set_text(part.as_str())?;
            let mut split = BlockProxy::new(block, host.clone());
            split.extend_overrides(overrides.clone());
            context.add_proxy(split, Some(anchor));
            anchor = new_uuid;
        }
        if let Some(proxy) = context.proxy_mut(uuid) {
            proxy.block_mut().set_text(parts[0].as_str())?;
        }
        debug!("Split {} into {} blocks", uuid, parts.len());
    }
    Ok(())
}
