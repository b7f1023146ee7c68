use blocklog_model::{
    Entity, FieldDefinition, FieldItem, ModelError, ViolationKind, CONTENT_FIELD,
    LIBRARY_BLOCK_FIELD,
};
use blocklog_types::{EntityType, EntityUuid};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn make_article() -> Entity {
    Entity::new(EntityUuid::new(), EntityType::Content, "article")
        .with_field(FieldDefinition::text("title", "Title").required())
        .with_field(FieldDefinition::number("rating", "Rating"))
        .with_field(FieldDefinition::blocks("content", "Content"))
}

// ── Construction & schema ────────────────────────────────────────

#[test]
fn fields_keep_declaration_order() {
    let e = make_article();
    let ids: Vec<&str> = e.fields().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["title", "rating", "content"]);
}

#[test]
fn add_field_rejects_duplicates() {
    let mut e = make_article();
    let err = e.add_field(FieldDefinition::text("title", "Again")).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateField(id) if id == "title"));
}

#[test]
fn get_unknown_field_fails_fast() {
    let e = make_article();
    let err = e.get("missing").unwrap_err();
    assert!(matches!(err, ModelError::UnknownField { ref field, .. } if field == "missing"));
    assert!(e.field("missing").is_none());
}

#[test]
fn content_page_has_content_blocks() {
    let page = Entity::content_page(EntityUuid::new());
    assert_eq!(page.entity_type(), EntityType::Content);
    assert_eq!(page.bundle(), "page");
    assert!(page.get(CONTENT_FIELD).unwrap().kind.is_blocks());
}

#[test]
fn library_item_references_its_block() {
    let block = EntityUuid::new();
    let item = Entity::library_item(EntityUuid::new(), "Hero", block);
    assert_eq!(item.entity_type(), EntityType::LibraryItem);
    assert_eq!(item.text("label"), Some("Hero"));
    assert_eq!(item.get(LIBRARY_BLOCK_FIELD).unwrap().references(), vec![block]);
    assert!(item.references_block(&block));
}

// ── Values ───────────────────────────────────────────────────────

#[test]
fn values_and_set_values() {
    let mut e = make_article();
    let child = EntityUuid::new();
    let mut values = BTreeMap::new();
    values.insert("title".to_string(), vec![FieldItem::text("Hello")]);
    values.insert("content".to_string(), vec![FieldItem::Reference(child)]);
    e.set_values(values).unwrap();

    assert_eq!(e.text("title"), Some("Hello"));
    assert_eq!(e.get("content").unwrap().references(), vec![child]);

    let all = e.values();
    assert_eq!(all.len(), 3);
    assert_eq!(all["rating"], Vec::<FieldItem>::new());
}

#[test]
fn set_values_is_all_or_nothing() {
    let mut e = make_article();
    let mut values = BTreeMap::new();
    values.insert("title".to_string(), vec![FieldItem::text("Hello")]);
    values.insert("nope".to_string(), vec![]);
    assert!(e.set_values(values).is_err());
    assert_eq!(e.text("title"), None);
}

#[test]
fn set_field_checks_kind() {
    let mut e = make_article();
    let err = e.set_field("rating", vec![FieldItem::text("five")]).unwrap_err();
    assert!(matches!(err, ModelError::FieldKindMismatch { ref field, .. } if field == "rating"));
    e.set_field("rating", vec![FieldItem::Number(5.0)]).unwrap();
    assert_eq!(e.get("rating").unwrap().list, vec![FieldItem::Number(5.0)]);
}

#[test]
fn block_fields_filters_by_kind() {
    let e = make_article();
    let ids: Vec<&str> = e.block_fields().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["content"]);
}

// ── Validation ───────────────────────────────────────────────────

#[test]
fn required_empty_field_is_reported() {
    let e = make_article();
    let violations = e.validate();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].field, "title");
    assert_eq!(violations[0].kind, ViolationKind::Required);
}

#[test]
fn whitespace_text_counts_as_empty() {
    let mut e = make_article();
    e.set_field("title", vec![FieldItem::text("   ")]).unwrap();
    assert_eq!(e.validate()[0].kind, ViolationKind::Required);
}

#[test]
fn cardinality_overflow_is_reported_not_enforced() {
    let mut e = make_article();
    e.set_field("title", vec![FieldItem::text("a"), FieldItem::text("b")])
        .unwrap();
    let violations = e.validate();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].kind, ViolationKind::Cardinality);
    assert_eq!(e.get("title").unwrap().list.len(), 2);
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn entity_json_roundtrip() {
    let mut e = make_article();
    e.set_field("title", vec![FieldItem::text("Hi")]).unwrap();
    let json = serde_json::to_string(&e).unwrap();
    let back: Entity = serde_json::from_str(&json).unwrap();
    assert_eq!(back, e);
}

#[test]
fn field_item_json_shape() {
    let uuid = EntityUuid::new();
    let json = serde_json::to_value(FieldItem::Reference(uuid)).unwrap();
    assert_eq!(json["type"], "reference");
    assert_eq!(json["value"], uuid.to_string());
}
