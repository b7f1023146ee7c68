//! Folding a replayed context into the renderable snapshot.

use crate::{BlockProxy, Host, MutationContext};
use blocklog_model::{Bundle, FieldItem, ViolationKind};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One block in a materialized field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldListItem {
    pub uuid: EntityUuid,
    pub bundle: Bundle,
    /// Persisted options with overrides applied.
    pub options: BTreeMap<String, String>,
    /// Field values other than options and nested block lists.
    pub props: BTreeMap<String, Vec<FieldItem>>,
}

/// The ordered content of one block field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutatedField {
    pub name: String,
    pub entity_type: EntityType,
    pub entity_uuid: EntityUuid,
    pub list: Vec<FieldListItem>,
}

impl MutatedField {
    /// Uuids of the list, in order.
    #[must_use]
    pub fn uuids(&self) -> Vec<EntityUuid> {
        self.list.iter().map(|item| item.uuid).collect()
    }
}

/// A block's self-validation problem, tagged with the block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub uuid: EntityUuid,
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

/// The document as of one log position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializedState {
    pub mutated_options: BTreeMap<EntityUuid, BTreeMap<String, String>>,
    pub fields: Vec<MutatedField>,
    pub violations: Vec<Violation>,
}

impl MaterializedState {
    /// Looks up a field by its host.
    #[must_use]
    pub fn field(
        &self,
        entity_type: EntityType,
        entity_uuid: &EntityUuid,
        name: &str,
    ) -> Option<&MutatedField> {
        self.fields.iter().find(|f| {
            f.entity_type == entity_type && f.entity_uuid == *entity_uuid && f.name == name
        })
    }

    /// The uuids listed in a field; empty when the field is absent.
    #[must_use]
    pub fn field_uuids(
        &self,
        entity_type: EntityType,
        entity_uuid: &EntityUuid,
        name: &str,
    ) -> Vec<EntityUuid> {
        self.field(entity_type, entity_uuid, name)
            .map(MutatedField::uuids)
            .unwrap_or_default()
    }

    /// Returns true if the block appears in any field.
    #[must_use]
    pub fn contains(&self, uuid: &EntityUuid) -> bool {
        self.fields
            .iter()
            .any(|f| f.list.iter().any(|item| item.uuid == *uuid))
    }
}

fn list_item(proxy: &BlockProxy) -> FieldListItem {
    FieldListItem {
        uuid: proxy.uuid(),
        bundle: proxy.bundle(),
        options: proxy.options(),
        props: proxy.block().props(),
    }
}

/// Derives fields, options and violations from the live proxies.
///
/// Fields come out as the root's block fields, then the block fields of each
/// live block in list order, then any other host (a library item, say) in
/// order of first appearance. Block fields are listed even when empty.
pub(crate) fn materialize(context: &MutationContext<'_>) -> MaterializedState {
    let live: Vec<&BlockProxy> = context
        .iter()
        .filter(|proxy| context.is_live(&proxy.uuid()))
        .collect();

    let mut lists: HashMap<&Host, Vec<FieldListItem>> = HashMap::new();
    let mut hosts: Vec<Host> = Vec::new();
    for proxy in &live {
        let entry = lists.entry(proxy.host()).or_default();
        if entry.is_empty() {
            hosts.push(proxy.host().clone());
        }
        entry.push(list_item(proxy));
    }

    let root = context.root();
    let mut order: Vec<Host> = root
        .block_fields()
        .map(|f| Host::new(root.entity_type(), root.uuid(), f.id.clone()))
        .collect();
    for proxy in &live {
        order.extend(
            proxy
                .block()
                .entity()
                .block_fields()
                .map(|f| Host::block(proxy.uuid(), f.id.clone())),
        );
    }
    for host in hosts {
        if !order.contains(&host) {
            order.push(host);
        }
    }

    let fields = order
        .into_iter()
        .map(|host| {
            let list = lists.remove(&host).unwrap_or_default();
            MutatedField {
                name: host.field,
                entity_type: host.entity_type,
                entity_uuid: host.entity_uuid,
                list,
            }
        })
        .collect();

    let mutated_options = live
        .iter()
        .map(|proxy| (proxy.uuid(), proxy.options()))
        .collect();

    let violations = if context.config().collect_violations {
        live.iter()
            .flat_map(|proxy| {
                let uuid = proxy.uuid();
                proxy
                    .block()
                    .validate()
                    .into_iter()
                    .map(move |v| Violation {
                        uuid,
                        field: v.field,
                        kind: v.kind,
                        message: v.message,
                    })
            })
            .collect()
    } else {
        Vec::new()
    };

    MaterializedState {
        mutated_options,
        fields,
        violations,
    }
}
