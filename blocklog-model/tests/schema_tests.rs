use blocklog_model::{Cardinality, FieldDefinition, FieldItem, FieldKind};
use blocklog_types::EntityUuid;
use std::collections::BTreeMap;

// ── FieldDefinition constructors ─────────────────────────────────

#[test]
fn text_definition_is_scalar_and_optional() {
    let f = FieldDefinition::text("title", "Title");
    assert_eq!(f.id, "title");
    assert_eq!(f.label, "Title");
    assert_eq!(f.kind, FieldKind::Text);
    assert_eq!(f.cardinality, Cardinality::Single);
    assert!(!f.required);
}

#[test]
fn required_marks_definition() {
    let f = FieldDefinition::text("title", "Title").required();
    assert!(f.required);
}

#[test]
fn blocks_definition_is_unbounded() {
    let f = FieldDefinition::blocks("content", "Content");
    assert_eq!(f.kind, FieldKind::Blocks);
    assert_eq!(f.cardinality, Cardinality::Unbounded);
}

#[test]
fn with_cardinality_overrides() {
    let f = FieldDefinition::blocks("slides", "Slides").with_cardinality(Cardinality::Limited(3));
    assert_eq!(f.cardinality, Cardinality::Limited(3));
}

#[test]
fn options_definition() {
    let f = FieldDefinition::options();
    assert_eq!(f.id, blocklog_model::OPTIONS_FIELD);
    assert_eq!(f.kind, FieldKind::Options);
}

// ── FieldKind ────────────────────────────────────────────────────

#[test]
fn kind_accepts_matching_items() {
    let uuid = EntityUuid::new();
    assert!(FieldKind::Text.accepts(&FieldItem::text("x")));
    assert!(FieldKind::Number.accepts(&FieldItem::Number(1.5)));
    assert!(FieldKind::Bool.accepts(&FieldItem::Bool(true)));
    assert!(FieldKind::Blocks.accepts(&FieldItem::Reference(uuid)));
    assert!(FieldKind::Media.accepts(&FieldItem::Reference(uuid)));
    assert!(FieldKind::LibraryItem.accepts(&FieldItem::Reference(uuid)));
    assert!(FieldKind::Options.accepts(&FieldItem::Options(BTreeMap::new())));
}

#[test]
fn kind_rejects_other_items() {
    assert!(!FieldKind::Text.accepts(&FieldItem::Number(1.0)));
    assert!(!FieldKind::Blocks.accepts(&FieldItem::text("x")));
    assert!(!FieldKind::Options.accepts(&FieldItem::Bool(false)));
}

#[test]
fn only_blocks_kind_is_blocks() {
    assert!(FieldKind::Blocks.is_blocks());
    assert!(!FieldKind::LibraryItem.is_blocks());
    assert!(!FieldKind::Media.is_blocks());
}

// ── Cardinality ──────────────────────────────────────────────────

#[test]
fn cardinality_allows() {
    assert!(Cardinality::Single.allows(0));
    assert!(Cardinality::Single.allows(1));
    assert!(!Cardinality::Single.allows(2));
    assert!(Cardinality::Unbounded.allows(10_000));
    assert!(Cardinality::Limited(3).allows(3));
    assert!(!Cardinality::Limited(3).allows(4));
}

#[test]
fn cardinality_serializes_as_integer() {
    assert_eq!(serde_json::to_string(&Cardinality::Single).unwrap(), "1");
    assert_eq!(serde_json::to_string(&Cardinality::Unbounded).unwrap(), "-1");
    assert_eq!(serde_json::to_string(&Cardinality::Limited(4)).unwrap(), "4");
}

#[test]
fn oversized_limit_saturates_instead_of_wrapping() {
    assert_eq!(i32::from(Cardinality::Limited(u32::MAX)), i32::MAX);
    let json = serde_json::to_string(&Cardinality::Limited(u32::MAX)).unwrap();
    assert_eq!(json, i32::MAX.to_string());
    let back: Cardinality = serde_json::from_str(&json).unwrap();
    assert!(back.allows(1_000_000));
}

#[test]
fn cardinality_deserializes_from_integer() {
    let c: Cardinality = serde_json::from_str("-1").unwrap();
    assert_eq!(c, Cardinality::Unbounded);
    let c: Cardinality = serde_json::from_str("1").unwrap();
    assert_eq!(c, Cardinality::Single);
    let c: Cardinality = serde_json::from_str("7").unwrap();
    assert_eq!(c, Cardinality::Limited(7));
}

#[test]
fn cardinality_rejects_zero_and_negative() {
    assert!(serde_json::from_str::<Cardinality>("0").is_err());
    assert!(serde_json::from_str::<Cardinality>("-2").is_err());
}
