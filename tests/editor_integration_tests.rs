//! Integration tests for the editor, menu commands and AppContext
//!
//! These tests drive the headless editor through simple recording fakes
//! for the view and the dialogs, against an in-memory scene and a real
//! config directory.

use camino::Utf8PathBuf;
use nodeopt::host::{HostMenu, MemoryScene, NodeTarget, SceneSnapshot, SnapshotNode};
use nodeopt::models::{ApplyAction, RENDER_INTENSIVE_NODES};
use nodeopt::state::CheckState;
use nodeopt::ui::{
    AppContext, ClassRow, Dialogs, EditorView, Feedback, MenuAction, StatusKind, register,
};
use nodeopt::{ConfigManager, OptimizerConfig, Settings};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct FakeView {
    rows: Vec<ClassRow>,
    select_all: Option<CheckState>,
    selected: Vec<String>,
    statuses: Vec<(String, StatusKind)>,
    visible: bool,
    presented: usize,
}

impl EditorView for FakeView {
    fn set_rows(&mut self, rows: &[ClassRow]) {
        self.rows = rows.to_vec();
    }

    fn set_select_all(&mut self, state: CheckState) {
        self.select_all = Some(state);
    }

    fn set_visible_names(&mut self, _visible: &[String]) {}

    fn selected_names(&self) -> Vec<String> {
        self.selected.clone()
    }

    fn show_status(&mut self, text: &str, kind: StatusKind, _timeout: Duration) {
        self.statuses.push((text.to_string(), kind));
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn present(&mut self) {
        self.visible = true;
        self.presented += 1;
    }
}

#[derive(Default)]
struct FakeDialogs {
    answer: bool,
    save_path: Option<Utf8PathBuf>,
    open_path: Option<Utf8PathBuf>,
    errors: Vec<String>,
    warnings: Vec<String>,
    infos: Vec<String>,
}

impl Dialogs for FakeDialogs {
    fn info(&mut self, _title: &str, text: &str) {
        self.infos.push(text.to_string());
    }

    fn warn(&mut self, title: &str, _text: &str) {
        self.warnings.push(title.to_string());
    }

    fn error(&mut self, title: &str, _text: &str) {
        self.errors.push(title.to_string());
    }

    fn ask_yes_no(&mut self, _title: &str, _text: &str) -> bool {
        self.answer
    }

    fn save_file(&mut self, _title: &str, _filter: &str) -> Option<Utf8PathBuf> {
        self.save_path.clone()
    }

    fn open_file(&mut self, _title: &str, _filter: &str) -> Option<Utf8PathBuf> {
        self.open_path.clone()
    }
}

type TestContext = AppContext<MemoryScene, FakeView, FakeDialogs>;

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

fn context(dir: &Utf8PathBuf) -> TestContext {
    AppContext::without_logging(Settings {
        config_dir: Some(dir.clone()),
        ..Settings::default()
    })
}

fn scene() -> MemoryScene {
    MemoryScene::from_snapshot(&SceneSnapshot::new(vec![
        SnapshotNode::new("Kronos1", "Kronos"),
        SnapshotNode::new("Group1", "Group")
            .without_knob()
            .with_children(vec![SnapshotNode::new("Defocus1", "Defocus").disabled(true)]),
        SnapshotNode::new("Grade1", "Grade").selected(),
    ]))
}

fn parts() -> (MemoryScene, FakeView, FakeDialogs) {
    (scene(), FakeView::default(), FakeDialogs::default())
}

#[test]
fn test_first_open_writes_defaults_and_paints_rows() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    let editor = app.show_editor(parts);

    let view = editor.view();
    assert_eq!(view.rows.len(), RENDER_INTENSIVE_NODES.len());
    assert!(view.rows.iter().all(|row| row.checked));
    assert_eq!(view.select_all, Some(CheckState::Checked));
    assert_eq!(view.presented, 1);
    assert!(editor.refresh_pending());

    assert_eq!(
        ConfigManager::new(&dir).load().unwrap(),
        OptimizerConfig::factory_defaults()
    );
}

#[test]
fn test_counts_refresh_updates_labels() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    let editor = app.show_editor(parts);
    editor.refresh_counts_now();

    let rows = &editor.view().rows;
    let defocus = rows.iter().find(|row| row.name == "Defocus").unwrap();
    assert_eq!(defocus.label, "Defocus  1/1 disabled");
    let oflow = rows.iter().find(|row| row.name == "OFlow2").unwrap();
    assert_eq!(oflow.label, "OFlow2  0/0 disabled");
}

#[test]
fn test_visible_editor_is_reused() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    app.show_editor(parts).on_item_checked("Kronos", false);

    let mut rebuilt = false;
    let editor = app.show_editor(|| {
        rebuilt = true;
        parts()
    });

    assert!(!rebuilt);
    assert_eq!(editor.view().presented, 2);
    assert!(editor.save_pending());
}

#[test]
fn test_hidden_editor_is_flushed_and_rebuilt() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    let editor = app.show_editor(parts);
    editor.on_item_checked("Kronos", false);
    editor.view_mut().visible = false;

    let editor = app.show_editor(parts);

    assert_eq!(editor.view().presented, 1);
    let kronos = editor.view().rows.iter().find(|row| row.name == "Kronos").unwrap();
    assert!(!kronos.checked);
    assert_eq!(editor.view().select_all, Some(CheckState::Partial));
}

#[test]
fn test_close_editor_persists_pending_edits() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    app.show_editor(parts).on_select_all(CheckState::Unchecked);
    app.close_editor();

    assert!(app.editor().is_none());
    assert!(ConfigManager::new(&dir).load().unwrap().toggled.is_empty());
}

#[test]
fn test_export_reset_import_cycle() {
    let (_temp_dir, dir) = create_test_dir();
    let preset_path = dir.join("mine.csv");
    let mut app = context(&dir);

    let editor = app.show_editor(parts);
    editor.dialogs_mut().answer = true;
    editor.dialogs_mut().save_path = Some(preset_path.clone());
    editor.dialogs_mut().open_path = Some(preset_path.clone());

    // Custom list: add the selected Grade class, drop everything but Kronos
    editor.on_add_selected();
    editor.view_mut().selected = RENDER_INTENSIVE_NODES
        .iter()
        .filter(|name| **name != "Kronos")
        .map(|name| name.to_string())
        .collect();
    editor.on_remove_selected();
    editor.on_item_checked("Kronos", false);
    let custom = editor.state().to_config();
    assert_eq!(custom.classes, vec!["Kronos", "Grade"]);

    editor.on_export();
    assert!(preset_path.exists());

    editor.on_reset_defaults();
    assert_eq!(editor.state().to_config(), OptimizerConfig::factory_defaults());

    editor.on_import();
    assert_eq!(editor.state().to_config(), custom);
    assert_eq!(ConfigManager::new(&dir).load().unwrap(), custom);
    assert_eq!(
        editor.view().statuses.last(),
        Some(&("Imported preset (2 classes).".to_string(), StatusKind::Success))
    );
    assert!(editor.dialogs_mut().errors.is_empty());
}

#[test]
fn test_bad_import_keeps_current_list() {
    let (_temp_dir, dir) = create_test_dir();
    let bad = dir.join("bad.json");
    std::fs::write(&bad, "{\"classes\": 3}").unwrap();
    let mut app = context(&dir);

    let editor = app.show_editor(parts);
    editor.dialogs_mut().open_path = Some(bad);
    editor.on_import();

    assert_eq!(editor.dialogs_mut().errors, vec!["Import failed"]);
    assert_eq!(editor.state().to_config(), OptimizerConfig::factory_defaults());
}

#[test]
fn test_toggle_from_editor_reaches_nested_nodes() {
    let (_temp_dir, dir) = create_test_dir();
    let mut app = context(&dir);

    let editor = app.show_editor(parts);
    editor.on_toggle_heavy();

    assert_eq!(editor.dialogs_mut().infos, vec!["Disabled 1 node (out of 2)."]);
    assert!(editor.host().node("Kronos1").is_some_and(|n| n.is_disabled()));
    assert!(editor.host().node("Defocus1").is_some_and(|n| n.is_disabled()));
}

#[test]
fn test_run_action_feedback() {
    let (_temp_dir, dir) = create_test_dir();
    let app = context(&dir);
    let scene = scene();

    let feedback = app.run_action(&scene, ApplyAction::Enable);
    assert_eq!(feedback, Feedback::Info("Enabled 1 node (out of 2).".to_string()));
    assert_eq!(
        feedback.to_string(),
        "Heavy Node Optimizer: Enabled 1 node (out of 2)."
    );

    ConfigManager::new(&dir)
        .save(&OptimizerConfig::new(["Kronos"], Vec::<String>::new()))
        .unwrap();
    let feedback = app.run_action(&scene, ApplyAction::Disable);
    assert!(matches!(feedback, Feedback::Warning(_)));
    assert!(!scene.node("Kronos1").is_some_and(|n| n.is_disabled()));
}

#[derive(Default)]
struct FakeMenu {
    commands: Vec<(String, MenuAction, Option<String>)>,
    separators: usize,
}

impl HostMenu for FakeMenu {
    fn find_item(&self, label: &str) -> bool {
        self.commands.iter().any(|(l, _, _)| l == label)
    }

    fn add_command(
        &mut self,
        label: &str,
        action: MenuAction,
        shortcut: Option<&str>,
        _tooltip: &str,
    ) {
        self.commands
            .push((label.to_string(), action, shortcut.map(str::to_string)));
    }

    fn add_separator(&mut self) {
        self.separators += 1;
    }
}

#[test]
fn test_menu_registration_is_idempotent() {
    let mut menu = FakeMenu::default();

    assert!(register(&mut menu));
    assert!(!register(&mut menu));

    assert_eq!(menu.commands.len(), 4);
    assert_eq!(menu.separators, 1);
    assert_eq!(
        menu.commands[0],
        (
            "Toggle heavy nodes".to_string(),
            MenuAction::Toggle,
            Some("Ctrl+Alt+O".to_string())
        )
    );
}
