// Application context - owns the editor and the process-wide pieces
//
// The host calls into the optimizer from menu commands. AppContext is the
// one object those commands share: it holds the settings, the log guard,
// and at most one editor controller.

use crate::config::{ConfigManager, Settings};
use crate::host::SceneHost;
use crate::logging;
use crate::models::ApplyAction;
use crate::ui::controller::{Dialogs, EditorController, EditorView};
use crate::ui::menu::{Feedback, run_menu_action};
use tracing_appender::non_blocking::WorkerGuard;

pub struct AppContext<H: SceneHost, V: EditorView, D: Dialogs> {
    settings: Settings,
    config_manager: ConfigManager,
    editor: Option<EditorController<H, V, D>>,
    _log_guard: Option<WorkerGuard>,
}

impl<H: SceneHost, V: EditorView, D: Dialogs> AppContext<H, V, D> {
    /// Create the context and make sure file logging is running.
    pub fn new(settings: Settings) -> Self {
        let log_guard = logging::ensure_logging(&settings.resolved_log_dir(), settings.debug);
        Self::with_log_guard(settings, log_guard)
    }

    /// Create the context without touching the logging setup.
    pub fn without_logging(settings: Settings) -> Self {
        Self::with_log_guard(settings, None)
    }

    fn with_log_guard(settings: Settings, log_guard: Option<WorkerGuard>) -> Self {
        let config_manager = ConfigManager::new(settings.resolved_config_dir());
        Self {
            settings,
            config_manager,
            editor: None,
            _log_guard: log_guard,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_manager(&self) -> &ConfigManager {
        &self.config_manager
    }

    pub fn editor(&self) -> Option<&EditorController<H, V, D>> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorController<H, V, D>> {
        self.editor.as_mut()
    }

    /// Show the editor.
    ///
    /// A visible editor is raised and reused. Otherwise `build` supplies a
    /// fresh host, view and dialogs, and a new editor is bootstrapped from
    /// the saved config; a hidden previous editor is closed first.
    pub fn show_editor<F>(&mut self, build: F) -> &mut EditorController<H, V, D>
    where
        F: FnOnce() -> (H, V, D),
    {
        let editor = match self.editor.take() {
            Some(mut editor) if editor.is_visible() => {
                tracing::debug!("Reusing visible Optimizer editor");
                editor.present();
                editor
            }
            previous => {
                if let Some(mut stale) = previous {
                    stale.on_close();
                }

                let (host, view, dialogs) = build();
                let mut editor = EditorController::new(
                    host,
                    view,
                    dialogs,
                    self.config_manager.clone(),
                    &self.settings,
                );
                editor.bootstrap();
                editor.present();
                tracing::info!("Opened Optimizer editor");
                editor
            }
        };

        self.editor.insert(editor)
    }

    /// Run a bulk action from a menu command or hotkey.
    pub fn run_action(&self, host: &H, action: ApplyAction) -> Feedback {
        run_menu_action(&self.config_manager, host, action)
    }

    /// Flush and drop the editor, if any.
    pub fn close_editor(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.on_close();
        }
    }
}
