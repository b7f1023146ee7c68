use crate::{Entity, FieldDefinition, FieldItem, FieldViolation, ModelError, ModelResult};
use blocklog_types::{EntityType, EntityUuid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The closed set of block bundles. Each bundle declares its field schema and
/// default values statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bundle {
    Text,
    Title,
    Grid,
    Image,
    /// An instance of a reusable block stored in a library item.
    FromLibrary,
}

impl Bundle {
    pub const ALL: [Bundle; 5] = [
        Self::Text,
        Self::Title,
        Self::Grid,
        Self::Image,
        Self::FromLibrary,
    ];

    /// The stable bundle name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Title => "title",
            Self::Grid => "grid",
            Self::Image => "image",
            Self::FromLibrary => "from_library",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Title => "Title",
            Self::Grid => "Grid",
            Self::Image => "Image",
            Self::FromLibrary => "From library",
        }
    }

    /// The bundle's field schema. `options` is always the last field.
    #[must_use]
    pub fn field_definitions(&self) -> Vec<FieldDefinition> {
        let mut fields = match self {
            Self::Text => vec![FieldDefinition::text("text", "Text")],
            Self::Title => vec![FieldDefinition::text("title", "Title").required()],
            Self::Grid => vec![FieldDefinition::blocks("blocks", "Blocks")],
            Self::Image => vec![
                FieldDefinition::media("image", "Image").required(),
                FieldDefinition::text("caption", "Caption"),
            ],
            Self::FromLibrary => {
                vec![FieldDefinition::library_item("library_item", "Library item").required()]
            }
        };
        fields.push(FieldDefinition::options());
        fields
    }

    /// Option values a fresh block of this bundle starts with.
    #[must_use]
    pub fn default_options(&self) -> BTreeMap<String, String> {
        let pairs: &[(&str, &str)] = match self {
            Self::Title => &[("level", "h2")],
            Self::Grid => &[("columns", "2")],
            _ => &[],
        };
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// The field holding the block's main text, used by convert and transform.
    #[must_use]
    pub const fn text_field(&self) -> Option<&'static str> {
        match self {
            Self::Text => Some("text"),
            Self::Title => Some("title"),
            Self::Image => Some("caption"),
            Self::Grid | Self::FromLibrary => None,
        }
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bundle {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBundle(s.to_string()))
    }
}

/// A placeable content unit: an [`Entity`] of type `block` whose bundle
/// determines its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    bundle: Bundle,
    entity: Entity,
}

impl Block {
    /// Creates a block with the bundle's schema and default values.
    pub fn new(bundle: Bundle, uuid: EntityUuid) -> Self {
        let mut entity = Entity::new(uuid, EntityType::Block, bundle.as_str());
        for definition in bundle.field_definitions() {
            entity = entity.with_field(definition);
        }
        let mut block = Self { bundle, entity };
        block.set_options(bundle.default_options());
        block
    }

    /// Interprets a stored entity as a block.
    ///
    /// Schema fields missing from the stored entity are added empty, so data
    /// written before a field was declared still loads.
    pub fn from_entity(entity: Entity) -> ModelResult<Self> {
        if entity.entity_type() != EntityType::Block {
            return Err(ModelError::NotABlock {
                uuid: entity.uuid(),
                entity_type: entity.entity_type(),
            });
        }
        let bundle: Bundle = entity.bundle().parse()?;
        let mut block = Self::new(bundle, entity.uuid());
        let values = entity
            .values()
            .into_iter()
            .filter(|(id, _)| block.entity.has_field(id))
            .collect();
        block.entity.set_values(values)?;
        Ok(block)
    }

    /// Returns the block's uuid.
    #[must_use]
    pub fn uuid(&self) -> EntityUuid {
        self.entity.uuid()
    }

    /// Returns the bundle.
    #[must_use]
    pub fn bundle(&self) -> Bundle {
        self.bundle
    }

    /// Borrows the underlying entity.
    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Mutably borrows the underlying entity.
    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// Consumes the block, returning the underlying entity.
    #[must_use]
    pub fn into_entity(self) -> Entity {
        self.entity
    }

    /// Returns the persisted options.
    #[must_use]
    pub fn options(&self) -> BTreeMap<String, String> {
        match self
            .entity
            .field(crate::OPTIONS_FIELD)
            .and_then(|f| f.list.first())
        {
            Some(FieldItem::Options(options)) => options.clone(),
            _ => BTreeMap::new(),
        }
    }

    /// Replaces the persisted options.
    pub fn set_options(&mut self, options: BTreeMap<String, String>) {
        if let Ok(field) = self.entity.get_mut(crate::OPTIONS_FIELD) {
            field.list = vec![FieldItem::Options(options)];
        }
    }

    /// Returns the main text, if the bundle has one and it is set.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.entity.text(self.bundle.text_field()?)
    }

    /// Overwrites the main text. Fails for bundles without a text field.
    pub fn set_text(&mut self, text: impl Into<String>) -> ModelResult<()> {
        let field = self
            .bundle
            .text_field()
            .ok_or_else(|| ModelError::UnknownField {
                bundle: self.bundle.as_str().to_string(),
                field: "text".to_string(),
            })?;
        self.entity.set_field(field, vec![FieldItem::text(text)])
    }

    /// Copies this block's values into a new block with another uuid.
    ///
    /// Nested block references are not copied; a clone's children are
    /// placed by the caller.
    #[must_use]
    pub fn clone_with_uuid(&self, uuid: EntityUuid) -> Self {
        let mut clone = Self::new(self.bundle, uuid);
        let values = self
            .entity
            .fields()
            .iter()
            .filter(|f| !f.kind.is_blocks())
            .map(|f| (f.id.clone(), f.list.clone()))
            .collect();
        // Same bundle, same schema: ids and kinds always match.
        let _ = clone.entity.set_values(values);
        clone
    }

    /// Field values other than `options` and nested block lists, for rendering.
    #[must_use]
    pub fn props(&self) -> BTreeMap<String, Vec<FieldItem>> {
        self.entity
            .fields()
            .iter()
            .filter(|f| !f.kind.is_blocks() && f.id != crate::OPTIONS_FIELD)
            .map(|f| (f.id.clone(), f.list.clone()))
            .collect()
    }

    /// Self-validation against the bundle schema.
    #[must_use]
    pub fn validate(&self) -> Vec<FieldViolation> {
        self.entity.validate()
    }
}
