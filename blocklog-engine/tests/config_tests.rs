use blocklog_engine::{EngineConfig, EngineError};
use pretty_assertions::assert_eq;
use std::io::Write;

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert!(config.collect_violations);
    assert!(config.purge_deleted_on_save);
    assert_eq!(config.merge_separator, "\n\n");
}

#[test]
fn empty_document_yields_defaults() {
    assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
}

#[test]
fn partial_document_keeps_other_defaults() {
    let config = EngineConfig::from_toml_str("purge_deleted_on_save = false\n").unwrap();
    assert!(!config.purge_deleted_on_save);
    assert!(config.collect_violations);
    assert_eq!(config.merge_separator, "\n\n");
}

#[test]
fn full_document() {
    let toml = r#"
collect_violations = false
purge_deleted_on_save = false
merge_separator = " | "
"#;
    let config = EngineConfig::from_toml_str(toml).unwrap();
    assert_eq!(
        config,
        EngineConfig {
            collect_violations: false,
            purge_deleted_on_save: false,
            merge_separator: " | ".to_string(),
        }
    );
}

#[test]
fn empty_separator_is_rejected() {
    let result = EngineConfig::from_toml_str("merge_separator = \"\"");
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn wrong_type_is_rejected() {
    let result = EngineConfig::from_toml_str("collect_violations = \"yes\"");
    assert!(matches!(result, Err(EngineError::Config(_))));
}

// ── load_from ────────────────────────────────────────────────────

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = EngineConfig::load_from(&dir.path().join("blocklog.toml"));
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn load_from_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "collect_violations = false").unwrap();
    let config = EngineConfig::load_from(file.path());
    assert!(!config.collect_violations);
}

#[test]
fn load_from_invalid_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "this is not toml ===").unwrap();
    assert_eq!(EngineConfig::load_from(file.path()), EngineConfig::default());
}
