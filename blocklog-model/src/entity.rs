use crate::{Cardinality, FieldDefinition, FieldKind, ModelError, ModelResult};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single value stored in a field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldItem {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A `{uuid}` reference to an independently owned entity.
    Reference(EntityUuid),
    Options(BTreeMap<String, String>),
}

impl FieldItem {
    /// Shorthand for a text item.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the text if this is a text item.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the referenced uuid if this is a reference item.
    #[must_use]
    pub fn as_reference(&self) -> Option<EntityUuid> {
        match self {
            Self::Reference(uuid) => Some(*uuid),
            _ => None,
        }
    }
}

/// A typed attribute container owned by an [`Entity`].
///
/// Even scalar fields store their value as a 0-or-1 length list. The list is
/// not checked against the cardinality on write; see
/// [`Entity::validate`](crate::Entity::validate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub list: Vec<FieldItem>,
}

impl Field {
    /// Creates an empty field from its definition.
    pub fn from_definition(definition: FieldDefinition) -> Self {
        Self {
            id: definition.id,
            label: definition.label,
            kind: definition.kind,
            cardinality: definition.cardinality,
            required: definition.required,
            list: Vec::new(),
        }
    }

    /// Returns true if the field holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Replaces the list after checking every item against the field kind.
    pub fn set_list(&mut self, list: Vec<FieldItem>) -> ModelResult<()> {
        self.check_items(&list)?;
        self.list = list;
        Ok(())
    }

    fn check_items(&self, list: &[FieldItem]) -> ModelResult<()> {
        match list.iter().find(|item| !self.kind.accepts(item)) {
            Some(item) => Err(ModelError::FieldKindMismatch {
                field: self.id.clone(),
                expected: self.kind,
                found: format!("{item:?}"),
            }),
            None => Ok(()),
        }
    }

    /// Returns all referenced uuids in list order.
    #[must_use]
    pub fn references(&self) -> Vec<EntityUuid> {
        self.list.iter().filter_map(FieldItem::as_reference).collect()
    }
}

/// A generic entity: identity, discriminator, bundle and ordered fields.
///
/// Fields keep their declaration order, which is also the order in which the
/// block tree is walked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    uuid: EntityUuid,
    entity_type: EntityType,
    bundle: String,
    fields: Vec<Field>,
}

impl Entity {
    /// Creates an entity without any fields.
    pub fn new(uuid: EntityUuid, entity_type: EntityType, bundle: impl Into<String>) -> Self {
        Self {
            uuid,
            entity_type,
            bundle: bundle.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Entity::add_field`].
    ///
    /// Intended for schema declaration; a definition whose id already exists
    /// is ignored.
    #[must_use]
    pub fn with_field(mut self, definition: FieldDefinition) -> Self {
        let _ = self.add_field(definition);
        self
    }

    /// Registers a field. Only used while constructing an entity.
    pub fn add_field(&mut self, definition: FieldDefinition) -> ModelResult<()> {
        if self.has_field(&definition.id) {
            return Err(ModelError::DuplicateField(definition.id));
        }
        self.fields.push(Field::from_definition(definition));
        Ok(())
    }

    /// A content page with a `title` and a `content` block list.
    pub fn content_page(uuid: EntityUuid) -> Self {
        Self::new(uuid, EntityType::Content, "page")
            .with_field(FieldDefinition::text("title", "Title"))
            .with_field(FieldDefinition::blocks(crate::CONTENT_FIELD, "Content"))
    }

    /// A library item wrapping a single reusable block.
    pub fn library_item(uuid: EntityUuid, label: &str, block: EntityUuid) -> Self {
        let mut entity = Self::new(uuid, EntityType::LibraryItem, "default")
            .with_field(FieldDefinition::text("label", "Label").required())
            .with_field(
                FieldDefinition::blocks(crate::LIBRARY_BLOCK_FIELD, "Block")
                    .with_cardinality(Cardinality::Single)
                    .required(),
            );
        entity.fields[0].list = vec![FieldItem::text(label)];
        entity.fields[1].list = vec![FieldItem::Reference(block)];
        entity
    }

    /// Returns the entity's uuid.
    #[must_use]
    pub fn uuid(&self) -> EntityUuid {
        self.uuid
    }

    /// Returns the entity type discriminator.
    #[must_use]
    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// Returns the bundle name.
    #[must_use]
    pub fn bundle(&self) -> &str {
        &self.bundle
    }

    /// Returns all fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns true if a field with this id is declared.
    #[must_use]
    pub fn has_field(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id == id)
    }

    /// Looks up a field, returning `None` if it is not declared.
    #[must_use]
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Looks up a field. An unknown id is a programmer error.
    pub fn get(&self, id: &str) -> ModelResult<&Field> {
        self.field(id).ok_or_else(|| self.unknown_field(id))
    }

    /// Mutable form of [`Entity::get`].
    pub fn get_mut(&mut self, id: &str) -> ModelResult<&mut Field> {
        let err = self.unknown_field(id);
        self.fields.iter_mut().find(|f| f.id == id).ok_or(err)
    }

    fn unknown_field(&self, id: &str) -> ModelError {
        ModelError::UnknownField {
            bundle: self.bundle.clone(),
            field: id.to_string(),
        }
    }

    /// Returns every field's list keyed by field id.
    #[must_use]
    pub fn values(&self) -> BTreeMap<String, Vec<FieldItem>> {
        self.fields
            .iter()
            .map(|f| (f.id.clone(), f.list.clone()))
            .collect()
    }

    /// Bulk-overwrites field lists.
    ///
    /// All ids and kinds are checked before anything is written, so a failed
    /// call leaves the entity untouched. Fields absent from `values` keep their
    /// current list.
    pub fn set_values(&mut self, values: BTreeMap<String, Vec<FieldItem>>) -> ModelResult<()> {
        for (id, list) in &values {
            self.get(id)?.check_items(list)?;
        }
        for (id, list) in values {
            self.get_mut(&id)?.list = list;
        }
        Ok(())
    }

    /// Overwrites a single field's list.
    pub fn set_field(&mut self, id: &str, list: Vec<FieldItem>) -> ModelResult<()> {
        self.get_mut(id)?.set_list(list)
    }

    /// Returns the first text value of a field, if any.
    #[must_use]
    pub fn text(&self, id: &str) -> Option<&str> {
        self.field(id)?.list.first()?.as_text()
    }

    /// Iterates over the fields that hold nested block references.
    pub fn block_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.kind.is_blocks())
    }

    /// Returns true if any block field of this entity references `uuid`.
    #[must_use]
    pub fn references_block(&self, uuid: &EntityUuid) -> bool {
        self.block_fields().any(|f| f.references().contains(uuid))
    }
}
