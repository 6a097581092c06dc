// UI module - headless editor logic and host menu commands
//
// This module contains:
// - EditorController: editor behaviour over the EditorView and Dialogs seams
// - AppContext: owns the single editor instance and runs menu actions
// - menu: menu entries, result formatting and user feedback

pub mod app;
pub mod controller;
pub mod menu;

pub use app::AppContext;
pub use controller::{ClassRow, Dialogs, EditorController, EditorView, StatusKind};
pub use menu::{Feedback, MenuAction, format_result, register, run_menu_action};
