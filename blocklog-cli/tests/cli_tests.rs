use blocklog_cli::{run, Cli};
use blocklog_model::{Block, Bundle, Entity, FieldItem, CONTENT_FIELD};
use blocklog_storage::{EntityStorage, MemoryStorage};
use blocklog_types::{EntityType, EntityUuid};
use clap::Parser;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    _dir: TempDir,
    store: PathBuf,
    state: PathBuf,
    page: EntityUuid,
    block: EntityUuid,
}

impl Workspace {
    /// A store holding one page with one text block.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store.json");
        let state = dir.path().join("state.json");

        let mut block = Block::new(Bundle::Text, EntityUuid::new());
        block.set_text("hello").unwrap();
        let mut page = Entity::content_page(EntityUuid::new());
        page.set_field(CONTENT_FIELD, vec![FieldItem::Reference(block.uuid())])
            .unwrap();

        let ws = Self {
            page: page.uuid(),
            block: block.uuid(),
            _dir: dir,
            store,
            state,
        };
        MemoryStorage::from_entities([page, block.into_entity()])
            .write_json(&ws.store)
            .unwrap();
        ws
    }

    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let mut argv = vec![
            "blocklog".to_string(),
            "--store".to_string(),
            path_arg(&self.store),
            "--state".to_string(),
            path_arg(&self.state),
        ];
        argv.extend(args.iter().map(|a| a.to_string()));
        run(Cli::try_parse_from(argv)?)
    }

    fn content(&self) -> Vec<String> {
        let shown: serde_json::Value =
            serde_json::from_str(&self.run(&["show"]).unwrap()).unwrap();
        shown["fields"][0]["list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["uuid"].as_str().unwrap().to_string())
            .collect()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ── init ─────────────────────────────────────────────────────────

#[test]
fn init_picks_first_content_entity() {
    let ws = Workspace::new();
    assert_eq!(ws.run(&["init"]).unwrap(), ws.page.to_string());
    assert!(ws.state.exists());
}

#[test]
fn init_rejects_unknown_root() {
    let ws = Workspace::new();
    let missing = EntityUuid::new().to_string();
    assert!(ws.run(&["init", "--root", missing.as_str()]).is_err());
}

#[test]
fn commands_require_init() {
    let ws = Workspace::new();
    assert!(ws.run(&["show"]).is_err());
}

// ── commit / undo / redo / seek ──────────────────────────────────

#[test]
fn commit_undo_redo() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();

    let delete = format!(r#"{{"id":"delete","args":{{"uuids":["{}"]}}}}"#, ws.block);
    assert_eq!(ws.run(&["commit", delete.as_str()]).unwrap(), "0");
    assert!(ws.content().is_empty());

    assert_eq!(ws.run(&["undo"]).unwrap(), "-1");
    assert_eq!(ws.content(), vec![ws.block.to_string()]);

    assert_eq!(ws.run(&["redo"]).unwrap(), "0");
    assert!(ws.content().is_empty());

    assert_eq!(ws.run(&["seek", "-1"]).unwrap(), "-1");
    assert_eq!(ws.run(&["seek", "5"]).unwrap(), "0");
}

#[test]
fn commit_rejects_malformed_mutation() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    assert!(ws.run(&["commit", r#"{"id":"explode"}"#]).is_err());
    let history: serde_json::Value =
        serde_json::from_str(&ws.run(&["history"]).unwrap()).unwrap();
    assert_eq!(history["mutations"].as_array().unwrap().len(), 0);
}

#[test]
fn commit_rejects_mutation_that_fails_to_replay() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let edit = format!(
        r#"{{"id":"edit_field_value","args":{{"uuid":"{}","field":"headline","value":[]}}}}"#,
        ws.block
    );
    assert!(ws.run(&["commit", edit.as_str()]).is_err());

    let delete = format!(r#"{{"id":"delete","args":{{"uuids":["{}"]}}}}"#, ws.block);
    assert_eq!(ws.run(&["commit", delete.as_str()]).unwrap(), "0");
    assert_eq!(ws.content(), Vec::<String>::new());
}

#[test]
fn committed_uuids_survive_between_invocations() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let add = format!(
        r#"{{"id":"add","args":{{"bundle":"title","host":{{"entity_type":"content","entity_uuid":"{}","field":"content"}}}}}}"#,
        ws.page
    );
    ws.run(&["commit", add.as_str()]).unwrap();

    let first = ws.content();
    let second = ws.content();
    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
}

// ── show / history ───────────────────────────────────────────────

#[test]
fn show_at_index() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let delete = format!(r#"{{"id":"delete","args":{{"uuids":["{}"]}}}}"#, ws.block);
    ws.run(&["commit", delete.as_str()]).unwrap();

    let origin: serde_json::Value =
        serde_json::from_str(&ws.run(&["show", "--index", "-1"]).unwrap()).unwrap();
    assert_eq!(origin["fields"][0]["list"].as_array().unwrap().len(), 1);
}

#[test]
fn history_reports_plugin_ids() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let option = format!(
        r#"{{"id":"update_options","args":{{"options":[{{"uuid":"{}","key":"align","value":"left"}}]}}}}"#,
        ws.block
    );
    ws.run(&["commit", option.as_str()]).unwrap();

    let history: serde_json::Value =
        serde_json::from_str(&ws.run(&["history"]).unwrap()).unwrap();
    assert_eq!(history["current_index"], 0);
    assert_eq!(history["mutations"][0]["plugin_id"], "update_options");
    assert_eq!(history["mutations"][0]["affected_uuid"], ws.block.to_string());
}

// ── save ─────────────────────────────────────────────────────────

#[test]
fn save_writes_store_and_clears_log() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let option = format!(
        r#"{{"id":"update_options","args":{{"options":[{{"uuid":"{}","key":"align","value":"left"}}]}}}}"#,
        ws.block
    );
    ws.run(&["commit", option.as_str()]).unwrap();
    ws.run(&["save"]).unwrap();

    let store = MemoryStorage::open_json(&ws.store).unwrap();
    let block = store.load_block(&ws.block).unwrap().unwrap();
    assert_eq!(block.options()["align"], "left".to_string());
    assert!(store.load(EntityType::Content, &ws.page).unwrap().is_some());

    assert_eq!(ws.run(&["undo"]).unwrap(), "-1");
    let history: serde_json::Value =
        serde_json::from_str(&ws.run(&["history"]).unwrap()).unwrap();
    assert_eq!(history["mutations"].as_array().unwrap().len(), 0);
}

#[test]
fn config_file_is_honoured() {
    let ws = Workspace::new();
    ws.run(&["init"]).unwrap();
    let config = ws.store.with_file_name("blocklog.toml");
    std::fs::write(&config, "collect_violations = false\n").unwrap();

    let add = format!(
        r#"{{"id":"add","args":{{"bundle":"title","host":{{"entity_type":"content","entity_uuid":"{}","field":"content"}}}}}}"#,
        ws.page
    );
    ws.run(&["commit", add.as_str()]).unwrap();

    let with_config = ws
        .run(&["--config", path_arg(&config).as_str(), "show"])
        .unwrap();
    let shown: serde_json::Value = serde_json::from_str(&with_config).unwrap();
    assert_eq!(shown["violations"].as_array().unwrap().len(), 0);

    let shown: serde_json::Value = serde_json::from_str(&ws.run(&["show"]).unwrap()).unwrap();
    assert_eq!(shown["violations"].as_array().unwrap().len(), 1);
}
