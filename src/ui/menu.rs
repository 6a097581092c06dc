// Menu commands - hotkey and menu entry points that run without the editor

use crate::config::ConfigManager;
use crate::host::{HostMenu, SceneHost};
use crate::models::{ApplyAction, ApplyResult, AppliedState, NoopReason};
use crate::services::HeavyNodeApplier;
use std::fmt;

/// Host menu path the entries are registered under.
pub const MENU_PATH: [&str; 2] = ["Scripts", "Optimizer"];

/// Prefix for messages shown in the host's script console.
pub const FEEDBACK_PREFIX: &str = "Heavy Node Optimizer";

/// What a menu entry does when picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Toggle,
    OpenEditor,
    Disable,
    Enable,
}

impl MenuAction {
    /// The bulk action behind this entry; `None` for the editor entry.
    pub fn apply_action(self) -> Option<ApplyAction> {
        match self {
            MenuAction::Toggle => Some(ApplyAction::Toggle),
            MenuAction::Disable => Some(ApplyAction::Disable),
            MenuAction::Enable => Some(ApplyAction::Enable),
            MenuAction::OpenEditor => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCommand {
    pub label: &'static str,
    pub action: MenuAction,
    pub shortcut: Option<&'static str>,
    pub tooltip: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Command(MenuCommand),
    Separator,
}

pub const MENU_ITEMS: [MenuItem; 5] = [
    MenuItem::Command(MenuCommand {
        label: "Toggle heavy nodes",
        action: MenuAction::Toggle,
        shortcut: Some("Ctrl+Alt+O"),
        tooltip: "Toggle disable on all heavy nodes selected in Optimizer.",
    }),
    MenuItem::Command(MenuCommand {
        label: "Optimizer editor",
        action: MenuAction::OpenEditor,
        shortcut: None,
        tooltip: "Open the Optimizer window to manage heavy node classes.",
    }),
    MenuItem::Separator,
    MenuItem::Command(MenuCommand {
        label: "Disable Heavy Nodes",
        action: MenuAction::Disable,
        shortcut: None,
        tooltip: "Disable all heavy nodes currently marked as heavy.",
    }),
    MenuItem::Command(MenuCommand {
        label: "Enable Heavy Nodes",
        action: MenuAction::Enable,
        shortcut: None,
        tooltip: "Enable all heavy nodes currently marked as heavy.",
    }),
];

/// Add the optimizer entries to `menu`.
///
/// Returns `false` without touching the menu when the entries are
/// already present.
pub fn register<M: HostMenu>(menu: &mut M) -> bool {
    let first = MENU_ITEMS.iter().find_map(|item| match item {
        MenuItem::Command(cmd) => Some(cmd.label),
        MenuItem::Separator => None,
    });
    if first.is_some_and(|label| menu.find_item(label)) {
        tracing::debug!("Optimizer menu already registered");
        return false;
    }

    for item in &MENU_ITEMS {
        match item {
            MenuItem::Command(cmd) => {
                menu.add_command(cmd.label, cmd.action, cmd.shortcut, cmd.tooltip)
            }
            MenuItem::Separator => menu.add_separator(),
        }
    }

    tracing::info!("Registered Optimizer menu under {}", MENU_PATH.join("/"));
    true
}

/// User-facing text for an apply result.
pub fn format_result(result: &ApplyResult) -> String {
    if result.total == 0 {
        return match result.reason {
            Some(NoopReason::NoActiveClasses) => {
                "No active heavy classes. Open 'Optimizer editor' and check at least one class."
                    .to_string()
            }
            _ => "No heavy nodes found for the active classes in the current script.".to_string(),
        };
    }

    let verb = if result.action == AppliedState::Disabled {
        "Disabled"
    } else {
        "Enabled"
    };
    let noun = if result.changed == 1 { "node" } else { "nodes" };
    format!("{} {} {} (out of {}).", verb, result.changed, noun, result.total)
}

/// Non-modal feedback for a menu action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Warning(String),
    /// Shown modally by the host.
    Error(String),
}

impl Feedback {
    pub fn message(&self) -> &str {
        match self {
            Feedback::Info(msg) | Feedback::Warning(msg) | Feedback::Error(msg) => msg,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Error(msg) => write!(
                f,
                "{} failed.\n\n{}\n\nCheck optimizer.log for details.",
                FEEDBACK_PREFIX, msg
            ),
            _ => write!(f, "{}: {}", FEEDBACK_PREFIX, self.message()),
        }
    }
}

/// Load the saved class list and apply `action` to `host`.
///
/// A no-op result is a warning, anything else is info. Host failures are
/// logged and come back as [`Feedback::Error`].
pub fn run_menu_action<H: SceneHost>(
    config_manager: &ConfigManager,
    host: &H,
    action: ApplyAction,
) -> Feedback {
    let config = config_manager.safe_load_or_default();

    match HeavyNodeApplier::from_config(&config).apply(host, action) {
        Ok(result) => {
            let msg = format_result(&result);
            tracing::info!("Menu action {:?}: {}", action, msg);
            if result.total == 0 {
                Feedback::Warning(msg)
            } else {
                Feedback::Info(msg)
            }
        }
        Err(e) => {
            tracing::error!("Menu action {:?} failed: {}", action, e);
            Feedback::Error(e.to_string())
        }
    }
}
