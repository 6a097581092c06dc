// State management module
//
// This module provides the StateManager which wraps OptimizerState with
// thread-safe access using Arc<RwLock<T>> and emits change events for the
// editor.

use crate::host::ClassStats;
use crate::models::{AddError, ClassListModel, OptimizerConfig, RemoveOutcome, normalize_names};
use indexmap::{IndexMap, IndexSet};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Tri-state of the editor's "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Checked,
    /// Some, but not all, classes are checked.
    Partial,
}

/// The editor's working state: catalogue, checked subset and last counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizerState {
    pub classes: ClassListModel,

    /// Checked classes. Always a subset of `classes`.
    pub toggled: IndexSet<String>,

    /// Node counts from the last scene refresh.
    pub stats: IndexMap<String, ClassStats>,
}

impl OptimizerState {
    pub fn is_checked(&self, name: &str) -> bool {
        self.toggled.contains(name)
    }

    pub fn enabled_count(&self) -> usize {
        self.toggled.len()
    }

    pub fn select_all_state(&self) -> CheckState {
        let enabled = self.enabled_count();
        if self.classes.is_empty() || enabled == 0 {
            CheckState::Unchecked
        } else if enabled == self.classes.len() {
            CheckState::Checked
        } else {
            CheckState::Partial
        }
    }

    /// Checked classes in catalogue order.
    pub fn active_classes(&self) -> IndexSet<String> {
        self.classes
            .iter()
            .filter(|name| self.toggled.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Class names containing `text`, ignoring case. Blank text matches all.
    pub fn filter(&self, text: &str) -> Vec<String> {
        let needle = text.trim().to_lowercase();
        self.classes
            .iter()
            .filter(|name| needle.is_empty() || name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub fn to_config(&self) -> OptimizerConfig {
        OptimizerConfig::new(self.classes.iter(), self.active_classes())
    }

    /// Drop checked entries that are no longer catalogued and reorder the
    /// rest to follow the catalogue.
    fn prune_toggled(&mut self) {
        self.toggled = self.active_classes();
    }
}

/// Change events emitted when state is modified.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The catalogue's contents or order changed.
    ClassesChanged { total: usize },

    /// The checked subset changed.
    ToggledChanged { enabled: usize, total: usize },

    /// Per-class node counts were refreshed with different values.
    CountsUpdated,

    /// State was reset to factory defaults.
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// Every mutation goes through [`update()`](Self::update), which compares
/// the state before and after and broadcasts one [`StateChange`] per
/// aspect that actually changed. A mutation that changes nothing emits
/// nothing.
///
/// # Related Types
///
/// - [`OptimizerState`]: The underlying state structure
/// - [`crate::config::ConfigManager`]: Loads configurations into state
/// - [`crate::ui::EditorController`]: Primary consumer of state events
pub struct StateManager {
    state: Arc<RwLock<OptimizerState>>,

    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create an empty StateManager with a broadcast buffer of 100 events.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(OptimizerState::default())),
            state_tx,
        }
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> OptimizerState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let enabled = state_manager.read(|state| state.enabled_count());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&OptimizerState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// The update function may leave `toggled` pointing at classes it
    /// removed; those entries are pruned before the diff.
    ///
    /// # Returns
    /// The StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut OptimizerState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);
        state.prune_toggled();

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // No subscribers is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &OptimizerState, new: &OptimizerState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.classes != new.classes {
            changes.push(StateChange::ClassesChanged {
                total: new.classes.len(),
            });
        }

        // Set comparison: toggled order follows the catalogue and is covered above
        if old.toggled != new.toggled {
            changes.push(StateChange::ToggledChanged {
                enabled: new.enabled_count(),
                total: new.classes.len(),
            });
        }

        if old.stats != new.stats {
            changes.push(StateChange::CountsUpdated);
        }

        changes
    }

    // Convenience methods for common state updates

    /// Replace the catalogue and checked subset with a loaded config.
    pub fn load_from_config(&self, config: &OptimizerConfig) -> Vec<StateChange> {
        let changes = self.replace_classes(&config.classes, &config.toggled);
        tracing::info!(
            "Loaded config: {} classes, {} toggled",
            config.classes.len(),
            config.toggled.len()
        );
        changes
    }

    /// Current state as a persistable record.
    pub fn to_config(&self) -> OptimizerConfig {
        self.read(OptimizerState::to_config)
    }

    /// Replace catalogue and checked subset wholesale (load, import, reset).
    pub fn replace_classes<C, T, S1, S2>(&self, classes: C, toggled: T) -> Vec<StateChange>
    where
        C: IntoIterator<Item = S1>,
        T: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let toggled: IndexSet<String> = normalize_names(toggled).into_iter().collect();
        self.update(|state| {
            state.classes.replace_all(classes);
            state.toggled = toggled;
        })
    }

    /// Append a class; new classes start checked.
    pub fn add_class(&self, name: &str) -> Result<Vec<StateChange>, AddError> {
        let mut result = Ok(());
        let changes = self.update(|state| {
            result = state.classes.add(name);
            if result.is_ok() {
                state.toggled.insert(name.trim().to_string());
            }
        });
        result.map(|()| changes)
    }

    pub fn remove_classes<I, S>(&self, names: I) -> (RemoveOutcome, Vec<StateChange>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut outcome = RemoveOutcome::default();
        let changes = self.update(|state| {
            outcome = state.classes.remove(names);
        });
        (outcome, changes)
    }

    /// Check or uncheck one catalogued class. Unknown names are ignored.
    pub fn set_checked(&self, name: &str, checked: bool) -> Vec<StateChange> {
        let name = name.trim();
        self.update(|state| {
            if !state.classes.contains(name) {
                return;
            }
            if checked {
                state.toggled.insert(name.to_string());
            } else {
                state.toggled.shift_remove(name);
            }
        })
    }

    /// Apply the "select all" checkbox. `Partial` checks everything.
    pub fn set_all_checked(&self, check: CheckState) -> Vec<StateChange> {
        self.update(|state| match check {
            CheckState::Unchecked => state.toggled.clear(),
            CheckState::Checked | CheckState::Partial => {
                state.toggled = state.classes.iter().cloned().collect();
            }
        })
    }

    /// Reorder the catalogue.
    ///
    /// Unknown names are ignored; catalogued classes missing from `names`
    /// keep their relative order after the listed ones.
    pub fn reorder<I, S>(&self, names: I) -> Vec<StateChange>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = normalize_names(names);
        self.update(|state| {
            let mut ordered: Vec<String> = names
                .into_iter()
                .filter(|name| state.classes.contains(name))
                .collect();
            let listed: IndexSet<String> = ordered.iter().cloned().collect();
            ordered.extend(state.classes.iter().filter(|n| !listed.contains(*n)).cloned());
            state.classes.replace_all(ordered);
        })
    }

    pub fn set_stats(&self, stats: IndexMap<String, ClassStats>) -> Vec<StateChange> {
        self.update(|state| state.stats = stats)
    }

    /// Restore the factory defaults and emit [`StateChange::StateReset`].
    pub fn reset_to_defaults(&self) -> Vec<StateChange> {
        let defaults = OptimizerConfig::factory_defaults();
        let mut changes = self.replace_classes(&defaults.classes, &defaults.toggled);

        let reset_event = StateChange::StateReset;
        let _ = self.state_tx.send(reset_event.clone());
        changes.push(reset_event);

        changes
    }

    pub fn select_all_state(&self) -> CheckState {
        self.read(OptimizerState::select_all_state)
    }

    pub fn active_classes(&self) -> IndexSet<String> {
        self.read(OptimizerState::active_classes)
    }

    pub fn filter(&self, text: &str) -> Vec<String> {
        self.read(|state| state.filter(text))
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Clones share the same state and channel
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(classes: &[&str], toggled: &[&str]) -> StateManager {
        let manager = StateManager::new();
        manager.replace_classes(classes, toggled);
        manager
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(state.classes.is_empty());
        assert!(state.toggled.is_empty());
        assert_eq!(state.select_all_state(), CheckState::Unchecked);
    }

    #[test]
    fn test_load_from_config_emits_changes() {
        let manager = StateManager::new();
        let config = OptimizerConfig::new(["Kronos", "Defocus"], ["Defocus"]);

        let changes = manager.load_from_config(&config);

        assert_eq!(
            changes,
            vec![
                StateChange::ClassesChanged { total: 2 },
                StateChange::ToggledChanged { enabled: 1, total: 2 },
            ]
        );
        assert_eq!(manager.to_config(), config);
    }

    #[test]
    fn test_identical_reload_emits_nothing() {
        let manager = manager_with(&["Kronos", "Defocus"], &["Defocus"]);
        let changes = manager.replace_classes(["Kronos", "Defocus"], ["Defocus"]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_toggled_outside_classes_is_dropped() {
        let manager = manager_with(&["Kronos"], &["Kronos", "Blur"]);
        assert_eq!(manager.active_classes().len(), 1);
        assert!(!manager.read(|s| s.is_checked("Blur")));
    }

    #[test]
    fn test_add_class_starts_checked() {
        let manager = manager_with(&["Kronos"], &[]);

        let changes = manager.add_class("  Defocus ").unwrap();

        assert!(changes.contains(&StateChange::ClassesChanged { total: 2 }));
        assert!(manager.read(|s| s.is_checked("Defocus")));
        assert_eq!(manager.add_class("Defocus"), Err(AddError::Exists));
        assert_eq!(manager.add_class(" "), Err(AddError::Empty));
    }

    #[test]
    fn test_remove_prunes_toggled() {
        let manager = manager_with(&["A", "B", "C"], &["A", "C"]);

        let (outcome, changes) = manager.remove_classes(["A", "B"]);

        assert_eq!(outcome.removed, 2);
        assert!(outcome.changed);
        assert!(changes.contains(&StateChange::ToggledChanged { enabled: 1, total: 1 }));
        assert_eq!(manager.to_config().toggled, vec!["C"]);

        let (outcome, changes) = manager.remove_classes(["A", "B"]);
        assert_eq!(outcome.removed, 0);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_set_checked() {
        let manager = manager_with(&["A", "B"], &[]);

        let changes = manager.set_checked("A", true);
        assert_eq!(changes, vec![StateChange::ToggledChanged { enabled: 1, total: 2 }]);
        assert_eq!(manager.select_all_state(), CheckState::Partial);

        assert!(manager.set_checked("A", true).is_empty());
        assert!(manager.set_checked("Missing", true).is_empty());

        manager.set_checked("B", true);
        assert_eq!(manager.select_all_state(), CheckState::Checked);
    }

    #[test]
    fn test_set_all_checked_partial_checks_all() {
        let manager = manager_with(&["A", "B", "C"], &["B"]);

        manager.set_all_checked(CheckState::Partial);
        assert_eq!(manager.select_all_state(), CheckState::Checked);

        manager.set_all_checked(CheckState::Unchecked);
        assert_eq!(manager.select_all_state(), CheckState::Unchecked);
    }

    #[test]
    fn test_reorder_keeps_unlisted_and_toggles() {
        let manager = manager_with(&["A", "B", "C"], &["A"]);

        let changes = manager.reorder(["C", "Z", "A"]);

        assert_eq!(changes, vec![StateChange::ClassesChanged { total: 3 }]);
        let state = manager.snapshot();
        assert_eq!(state.classes.as_list(), vec!["C", "A", "B"]);
        assert!(state.is_checked("A"));
    }

    #[test]
    fn test_reorder_to_same_order_emits_nothing() {
        let manager = manager_with(&["A", "B", "C"], &["A", "C"]);

        assert_eq!(
            manager.reorder(["C", "A", "B"]),
            vec![StateChange::ClassesChanged { total: 3 }]
        );
        assert!(manager.reorder(["C", "A", "B"]).is_empty());
    }

    #[test]
    fn test_removing_unchecked_class_leaves_toggles_alone() {
        let manager = manager_with(&["A", "B", "C"], &["A"]);

        let (_, changes) = manager.remove_classes(["B"]);

        assert_eq!(changes, vec![StateChange::ClassesChanged { total: 2 }]);
    }

    #[test]
    fn test_set_stats_only_reports_differences() {
        let manager = manager_with(&["Kronos"], &["Kronos"]);
        let mut stats = IndexMap::new();
        stats.insert("Kronos".to_string(), ClassStats { total: 2, disabled: 1 });

        assert_eq!(manager.set_stats(stats.clone()), vec![StateChange::CountsUpdated]);
        assert!(manager.set_stats(stats).is_empty());
    }

    #[test]
    fn test_reset_to_defaults() {
        let manager = manager_with(&["Custom"], &[]);

        let changes = manager.reset_to_defaults();

        assert_eq!(changes.last(), Some(&StateChange::StateReset));
        assert_eq!(manager.to_config(), OptimizerConfig::factory_defaults());
        assert_eq!(manager.select_all_state(), CheckState::Checked);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let manager = manager_with(&["ZDefocus2", "Defocus", "Kronos"], &[]);

        assert_eq!(manager.filter("defo"), vec!["ZDefocus2", "Defocus"]);
        assert_eq!(manager.filter("  ").len(), 3);
        assert!(manager.filter("blur").is_empty());
    }

    #[test]
    fn test_subscribe_to_changes() {
        let manager = StateManager::new();
        let mut rx = manager.subscribe();

        manager.add_class("Kronos").unwrap();

        assert_eq!(rx.try_recv().unwrap(), StateChange::ClassesChanged { total: 1 });
        assert!(matches!(rx.try_recv().unwrap(), StateChange::ToggledChanged { .. }));
    }

    #[test]
    fn test_clone_shares_state() {
        let manager1 = StateManager::new();
        let manager2 = manager1.clone();

        manager1.add_class("Kronos").unwrap();

        assert_eq!(manager2.snapshot().classes.len(), 1);
    }
}
