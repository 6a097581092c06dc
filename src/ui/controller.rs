// Editor Controller - Coordinates the optimizer editor with state management
//
// This module contains the EditorController which coordinates between:
// - EditorView (the passive list window, supplied by the host toolkit)
// - Dialogs (modal message boxes and file pickers)
// - StateManager (class list, toggles, counts)
// - ConfigManager (config.json persistence)
// - SceneHost (counts, selection, and the toggle action)
//
// Refreshes and saves triggered by rapid edits are coalesced with
// Debouncers that the embedding event loop drives through tick().

use crate::config::{ConfigManager, Settings};
use crate::debounce::Debouncer;
use crate::host::SceneHost;
use crate::services::{Preset, export_preset, import_preset, toggle_heavy_nodes};
use crate::state::{CheckState, OptimizerState, StateManager};
use crate::ui::menu::format_result;
use camino::Utf8PathBuf;
use std::time::{Duration, Instant};

pub const EXPORT_FILTER: &str = "JSON preset (*.json);;CSV preset (*.csv);;All files (*)";
pub const IMPORT_FILTER: &str = "Preset files (*.json *.csv);;All files (*)";

/// Colour of a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One row of the class list as the view should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRow {
    pub name: String,
    pub checked: bool,
    /// Name plus counts once known, e.g. `"Kronos  1/3 disabled"`.
    pub label: String,
    pub tooltip: Option<String>,
}

impl ClassRow {
    fn from_state(state: &OptimizerState, name: &str) -> Self {
        let stats = state.stats.get(name);
        Self {
            name: name.to_string(),
            checked: state.is_checked(name),
            label: stats.map_or_else(|| name.to_string(), |s| s.label(name)),
            tooltip: stats.map(|s| s.tooltip(name)),
        }
    }
}

/// The passive editor window.
///
/// Implementations only draw what they are told and report what the user
/// selected; every decision lives in [`EditorController`].
#[cfg_attr(test, mockall::automock)]
pub trait EditorView {
    fn set_rows(&mut self, rows: &[ClassRow]);

    fn set_select_all(&mut self, state: CheckState);

    /// Hide every row whose name is not in `visible`.
    fn set_visible_names(&mut self, visible: &[String]);

    /// Names of the highlighted rows.
    fn selected_names(&self) -> Vec<String>;

    fn show_status(&mut self, text: &str, kind: StatusKind, timeout: Duration);

    fn is_visible(&self) -> bool;

    /// Show, raise and focus the window.
    fn present(&mut self);
}

/// Modal dialogs owned by the host toolkit.
#[cfg_attr(test, mockall::automock)]
pub trait Dialogs {
    fn info(&mut self, title: &str, text: &str);

    fn warn(&mut self, title: &str, text: &str);

    fn error(&mut self, title: &str, text: &str);

    fn ask_yes_no(&mut self, title: &str, text: &str) -> bool;

    fn save_file(&mut self, title: &str, filter: &str) -> Option<Utf8PathBuf>;

    fn open_file(&mut self, title: &str, filter: &str) -> Option<Utf8PathBuf>;
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

/// Editor logic, independent of any widget toolkit.
///
/// # Example
/// ```ignore
/// let mut editor = EditorController::new(scene, view, dialogs, config_manager, &settings);
/// editor.bootstrap();
///
/// // In the host's idle loop:
/// editor.tick();
/// ```
pub struct EditorController<H: SceneHost, V: EditorView, D: Dialogs> {
    state: StateManager,
    config_manager: ConfigManager,
    host: H,
    view: V,
    dialogs: D,
    refresh: Debouncer<()>,
    save: Debouncer<()>,
    status_timeout: Duration,
}

impl<H: SceneHost, V: EditorView, D: Dialogs> EditorController<H, V, D> {
    pub fn new(
        host: H,
        view: V,
        dialogs: D,
        config_manager: ConfigManager,
        settings: &Settings,
    ) -> Self {
        Self {
            state: StateManager::new(),
            config_manager,
            host,
            view,
            dialogs,
            refresh: Debouncer::new(settings.refresh_delay()),
            save: Debouncer::new(settings.save_delay()),
            status_timeout: settings.status_timeout(),
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn dialogs_mut(&mut self) -> &mut D {
        &mut self.dialogs
    }

    pub fn is_visible(&self) -> bool {
        self.view.is_visible()
    }

    pub fn present(&mut self) {
        self.view.present();
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh.is_pending()
    }

    pub fn save_pending(&self) -> bool {
        self.save.is_pending()
    }

    /// Load the saved config (or defaults), paint the list and queue a
    /// count refresh.
    pub fn bootstrap(&mut self) {
        let config = self.config_manager.safe_load_or_default();
        self.state.load_from_config(&config);
        self.render();
        self.schedule_refresh();
    }

    fn render(&mut self) {
        let rows: Vec<ClassRow> = self.state.read(|state| {
            state
                .classes
                .iter()
                .map(|name| ClassRow::from_state(state, name))
                .collect()
        });
        self.view.set_rows(&rows);
        self.view.set_select_all(self.state.select_all_state());
    }

    fn status(&mut self, text: &str, kind: StatusKind) {
        self.view.show_status(text, kind, self.status_timeout);
    }

    fn schedule_refresh(&mut self) {
        self.refresh.schedule(());
    }

    fn schedule_save(&mut self) {
        self.save.schedule(());
    }

    /// Ask the host for per-class counts and redraw if they moved.
    pub fn refresh_counts_now(&mut self) {
        self.refresh.cancel();
        let classes = self.state.read(|state| state.classes.as_list());

        match self.host.class_stats(&classes) {
            Ok(stats) => {
                if !self.state.set_stats(stats).is_empty() {
                    self.render();
                }
            }
            Err(e) => tracing::warn!("Could not refresh class counts: {}", e),
        }
    }

    /// Write the current config immediately, cancelling any pending save.
    ///
    /// Failures are shown in an error dialog.
    pub fn persist_now(&mut self) -> bool {
        self.save.cancel();

        match self.config_manager.save(&self.state.to_config()) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Could not write config: {}", e);
                self.dialogs
                    .error("Save Error", &format!("Could not write config:\n{}", e));
                false
            }
        }
    }

    /// Run whichever debounced refresh or save is due.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.refresh.tick_at(now).is_some() {
            self.refresh_counts_now();
        }
        if self.save.tick_at(now).is_some() {
            self.persist_now();
        }
    }

    /// Window closed: write any pending change.
    pub fn on_close(&mut self) {
        self.refresh.cancel();
        if self.save.flush().is_some() {
            self.persist_now();
        }
    }

    pub fn on_toggle_heavy(&mut self) {
        let config = self.state.to_config();

        match toggle_heavy_nodes(&config, &self.host) {
            Ok(result) => self.dialogs.info("Optimizer", &format_result(&result)),
            Err(e) => {
                tracing::error!("Toggle heavy nodes failed: {}", e);
                self.dialogs
                    .error("Optimizer", &format!("Could not toggle heavy nodes:\n{}", e));
            }
        }
        self.schedule_refresh();
    }

    /// Add the classes of the host's selected nodes, after confirmation.
    pub fn on_add_selected(&mut self) {
        let classes = match self.host.selected_class_names() {
            Ok(classes) => classes,
            Err(e) => {
                self.dialogs
                    .error("Optimizer", &format!("Could not read the selection:\n{}", e));
                return;
            }
        };
        if classes.is_empty() {
            self.dialogs.warn("No nodes selected", "Select one or more nodes.");
            return;
        }

        let noun = if classes.len() == 1 { "class" } else { "classes" };
        let prompt = format!(
            "Add the following {} to the Optimizer list?\n\n{}",
            noun,
            classes.join(", ")
        );
        if !self.dialogs.ask_yes_no("Confirm add", &prompt) {
            return;
        }

        let mut added = 0;
        for name in &classes {
            match self.state.add_class(name) {
                Ok(_) => added += 1,
                Err(e) => {
                    tracing::debug!("Skipped class '{}': {}", name, e);
                    self.dialogs
                        .warn(e.title(), &format!("Skipped '{}': {}", name, e.code()));
                }
            }
        }

        if added == 0 {
            self.status("No classes added.", StatusKind::Info);
            return;
        }

        self.render();
        if self.persist_now() {
            self.schedule_refresh();
            let text = format!("Added {}.", plural(added, "class", "classes"));
            self.status(&text, StatusKind::Success);
        }
    }

    /// Remove the highlighted rows, after confirmation.
    pub fn on_remove_selected(&mut self) {
        let names = self.view.selected_names();
        if names.is_empty() {
            return;
        }

        let prompt = format!(
            "Remove {} from the Optimizer list?",
            plural(names.len(), "selected class", "selected classes")
        );
        if !self.dialogs.ask_yes_no("Confirm remove", &prompt) {
            return;
        }

        let (outcome, _) = self.state.remove_classes(&names);
        if !outcome.changed {
            self.status("No classes removed.", StatusKind::Info);
            return;
        }

        self.render();
        if self.persist_now() {
            self.schedule_refresh();
            let text = format!("Removed {}.", plural(outcome.removed, "class", "classes"));
            self.status(&text, StatusKind::Warning);
        }
    }

    pub fn on_item_checked(&mut self, name: &str, checked: bool) {
        self.state.set_checked(name, checked);
        self.view.set_select_all(self.state.select_all_state());
        self.schedule_save();
        self.schedule_refresh();
    }

    /// The "select all" box was clicked; a partial state checks everything.
    pub fn on_select_all(&mut self, check: CheckState) {
        self.state.set_all_checked(check);
        self.render();
        self.schedule_save();
        self.schedule_refresh();
    }

    pub fn on_filter_changed(&mut self, text: &str) {
        let visible = self.state.filter(text);
        self.view.set_visible_names(&visible);
    }

    pub fn on_export(&mut self) {
        let Some(path) = self.dialogs.save_file("Export Optimizer preset", EXPORT_FILTER) else {
            return;
        };

        let preset = Preset::from_config(&self.state.to_config());
        if let Err(e) = export_preset(&path, &preset) {
            tracing::error!("Export to {} failed: {}", path, e);
            self.dialogs
                .error("Export failed", &format!("Could not export preset:\n{}", e));
            return;
        }

        self.status("Preset exported.", StatusKind::Success);
    }

    /// Replace the list with a preset file. A bad file leaves everything as is.
    pub fn on_import(&mut self) {
        let Some(path) = self.dialogs.open_file("Import Optimizer preset", IMPORT_FILTER) else {
            return;
        };

        let preset = match import_preset(&path) {
            Ok(preset) => preset,
            Err(e) => {
                tracing::error!("Import from {} failed: {}", path, e);
                self.dialogs
                    .error("Import failed", &format!("Could not import preset:\n{}", e));
                return;
            }
        };

        self.state.replace_classes(&preset.classes, &preset.toggled);
        self.render();

        if self.persist_now() {
            let text = format!("Imported preset ({} classes).", preset.classes.len());
            self.status(&text, StatusKind::Success);
            self.schedule_refresh();
        }
    }

    pub fn on_reset_defaults(&mut self) {
        let confirmed = self.dialogs.ask_yes_no(
            "Reset to Defaults",
            "Reset the list to factory defaults? \
             This will replace your current list and check every class.",
        );
        if !confirmed {
            return;
        }

        self.state.reset_to_defaults();
        self.render();

        if self.persist_now() {
            let total = self.state.read(|state| state.classes.len());
            let text = format!("Defaults restored ({} classes).", total);
            self.status(&text, StatusKind::Success);
            self.schedule_refresh();
        }
    }

    /// Rows were dragged into a new order.
    pub fn on_reordered(&mut self, names: &[String]) {
        self.state.reorder(names);
        if self.persist_now() {
            self.schedule_refresh();
        }
    }
}
