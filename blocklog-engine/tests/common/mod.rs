#![allow(dead_code)]

use blocklog_engine::{EditState, EngineConfig, Host, MaterializedState, MutationContext};
use blocklog_model::{Block, Bundle, Entity, FieldItem, CONTENT_FIELD};
use blocklog_storage::{EntityStorage, MemoryStorage};
use blocklog_types::{EntityType, EntityUuid};

/// A content page in a memory store, plus the engine config to replay with.
pub struct Doc {
    pub storage: MemoryStorage,
    pub page: Entity,
    pub config: EngineConfig,
}

impl Doc {
    pub fn new() -> Self {
        let page = Entity::content_page(EntityUuid::new());
        let mut storage = MemoryStorage::new();
        storage.insert(page.clone());
        Self {
            storage,
            page,
            config: EngineConfig::default(),
        }
    }

    /// A page whose content is one text block per entry.
    pub fn with_texts(texts: &[&str]) -> (Self, Vec<EntityUuid>) {
        let mut doc = Self::new();
        let uuids = texts.iter().map(|t| doc.push(text_block(t))).collect();
        (doc, uuids)
    }

    pub fn uuid(&self) -> EntityUuid {
        self.page.uuid()
    }

    pub fn host(&self) -> Host {
        Host::content(self.page.uuid())
    }

    /// Stores a block and appends it to the page content.
    pub fn push(&mut self, block: Block) -> EntityUuid {
        let uuid = block.uuid();
        self.storage.insert_block(block);
        self.page
            .get_mut(CONTENT_FIELD)
            .unwrap()
            .list
            .push(FieldItem::Reference(uuid));
        self.storage.insert(self.page.clone());
        uuid
    }

    /// Stores a block and appends it to `parent`'s `blocks` field.
    pub fn push_child(&mut self, parent: EntityUuid, block: Block) -> EntityUuid {
        let uuid = block.uuid();
        self.storage.insert_block(block);
        let mut parent = self.storage.load_block(&parent).unwrap().unwrap();
        parent
            .entity_mut()
            .get_mut("blocks")
            .unwrap()
            .list
            .push(FieldItem::Reference(uuid));
        self.storage.insert_block(parent);
        uuid
    }

    pub fn edit_state(&self) -> EditState {
        EditState::new(self.page.uuid())
    }

    pub fn context(&self) -> MutationContext<'_> {
        MutationContext::new(&self.storage, self.page.clone(), &self.config).unwrap()
    }

    pub fn materialize(&self, state: &mut EditState) -> MaterializedState {
        state
            .materialize(&self.storage, self.page.clone(), &self.config)
            .unwrap()
    }

    pub fn materialize_at(&self, state: &mut EditState, index: isize) -> MaterializedState {
        state
            .materialize_at(&self.storage, self.page.clone(), &self.config, index)
            .unwrap()
    }

    /// The page content at the cursor.
    pub fn content(&self, state: &mut EditState) -> Vec<EntityUuid> {
        content_of(&self.materialize(state), self.page.uuid())
    }

    /// Reloads the page as saved.
    pub fn reload(&mut self) {
        self.page = self
            .storage
            .load(EntityType::Content, &self.page.uuid())
            .unwrap()
            .unwrap();
    }
}

pub fn content_of(state: &MaterializedState, page: EntityUuid) -> Vec<EntityUuid> {
    state.field_uuids(EntityType::Content, &page, CONTENT_FIELD)
}

pub fn children_of(state: &MaterializedState, block: EntityUuid) -> Vec<EntityUuid> {
    state.field_uuids(EntityType::Block, &block, "blocks")
}

pub fn text_block(text: &str) -> Block {
    let mut block = Block::new(Bundle::Text, EntityUuid::new());
    block.set_text(text).unwrap();
    block
}

pub fn grid_block() -> Block {
    Block::new(Bundle::Grid, EntityUuid::new())
}

/// The main text of a materialized block.
pub fn text_of(state: &MaterializedState, uuid: EntityUuid) -> Option<String> {
    state
        .fields
        .iter()
        .flat_map(|f| f.list.iter())
        .find(|item| item.uuid == uuid)
        .and_then(|item| {
            let field = item.bundle.text_field()?;
            item.props.get(field)?.first()?.as_text().map(str::to_string)
        })
}

pub fn bundle_of(state: &MaterializedState, uuid: EntityUuid) -> Option<Bundle> {
    state
        .fields
        .iter()
        .flat_map(|f| f.list.iter())
        .find(|item| item.uuid == uuid)
        .map(|item| item.bundle)
}
