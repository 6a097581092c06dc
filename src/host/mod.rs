//! Seams to the host compositing application.
//!
//! The optimizer never walks a scene graph itself. Everything it needs from
//! the host goes through the traits in this module:
//!
//! - [`NodeTarget`]: one node exposing the boolean `disable` flag
//! - [`SceneHost`]: node lookup, per-class counts, selection and undo scoping
//! - [`HostMenu`]: menu registration for the hotkey/menu commands
//!
//! [`MemoryScene`] is an in-memory implementation backed by a JSON scene
//! snapshot; it drives the command-line tool and the integration tests.

pub mod memory;
pub mod traversal;

pub use memory::{MemoryNode, MemoryScene, SceneSnapshot, SnapshotNode};
pub use traversal::{Traversal, TraversalStrategy, traverse_with};

use crate::ui::MenuAction;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by host adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Host API is not available: {0}")]
    Unavailable(String),

    #[error("Node {0} has no 'disable' knob")]
    KnobMissing(String),

    #[error("Node {0} refused the write: knob is locked")]
    KnobLocked(String),
}

/// A host node whose `disable` flag can be read and written.
#[cfg_attr(test, mockall::automock)]
pub trait NodeTarget {
    /// Display name, used in log messages.
    fn name(&self) -> String;

    fn class_name(&self) -> String;

    /// Current value of the `disable` flag.
    fn is_disabled(&self) -> bool;

    fn set_disabled(&mut self, disabled: bool) -> Result<(), HostError>;
}

/// Per-class node counts for the current scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    pub total: usize,
    pub disabled: usize,
}

impl ClassStats {
    /// List label, e.g. `"Kronos  1/3 disabled"`.
    pub fn label(&self, name: &str) -> String {
        format!("{}  {}/{} disabled", name, self.disabled, self.total)
    }

    pub fn tooltip(&self, name: &str) -> String {
        format!("{}: {} nodes ({} disabled)", name, self.total, self.disabled)
    }
}

/// The host scene as seen by the optimizer.
pub trait SceneHost {
    type Target: NodeTarget;

    /// Nodes whose class is in `active` and which expose the flag.
    ///
    /// Lookup is global: nodes nested inside groups are included.
    fn find_targets(&self, active: &IndexSet<String>) -> Result<Vec<Self::Target>, HostError>;

    /// Total and disabled counts for each class, in the order given.
    /// Classes with no nodes report zeros.
    fn class_stats(&self, classes: &[String]) -> Result<IndexMap<String, ClassStats>, HostError>;

    /// Sorted, unique, non-blank class names of the selected nodes.
    fn selected_class_names(&self) -> Result<Vec<String>, HostError>;

    /// Open an undo group; every write until [`end_undo`](Self::end_undo)
    /// is undone as one step.
    fn begin_undo(&self, _label: &str) {}

    fn end_undo(&self) {}
}

/// Host menu the optimizer registers its commands into.
pub trait HostMenu {
    fn find_item(&self, label: &str) -> bool;

    /// Add an entry that runs `action` when picked.
    fn add_command(
        &mut self,
        label: &str,
        action: MenuAction,
        shortcut: Option<&str>,
        tooltip: &str,
    );

    fn add_separator(&mut self);
}
