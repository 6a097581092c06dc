use crate::host::{HostError, NodeTarget, SceneHost};
use crate::models::{ApplyAction, ApplyResult, NoopReason, OptimizerConfig, normalize_names};
use indexmap::IndexSet;

/// Undo group label for one bulk apply.
pub fn undo_label(disable: bool) -> String {
    format!(
        "Heavy Node Optimizer: {} heavy nodes",
        if disable { "Disable" } else { "Enable" }
    )
}

/// Opens the host undo group on first use and closes it on drop.
struct UndoScope<'a, H: SceneHost> {
    host: &'a H,
    label: String,
    open: bool,
}

impl<'a, H: SceneHost> UndoScope<'a, H> {
    fn new(host: &'a H, label: String) -> Self {
        Self {
            host,
            label,
            open: false,
        }
    }

    fn ensure_open(&mut self) {
        if !self.open {
            self.host.begin_undo(&self.label);
            self.open = true;
        }
    }
}

impl<H: SceneHost> Drop for UndoScope<'_, H> {
    fn drop(&mut self) {
        if self.open {
            self.host.end_undo();
        }
    }
}

/// Decides and applies one uniform `disable` state across all heavy nodes.
///
/// The applier holds the catalogued classes and the checked ones; only
/// their intersection is acted on. It is stateless between calls: every
/// [`apply`](Self::apply) asks the host for fresh targets.
#[derive(Debug, Clone, Default)]
pub struct HeavyNodeApplier {
    configured: IndexSet<String>,
    enabled: IndexSet<String>,
}

impl HeavyNodeApplier {
    pub fn new<C, E, S1, S2>(configured: C, enabled: E) -> Self
    where
        C: IntoIterator<Item = S1>,
        E: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            configured: normalize_names(configured).into_iter().collect(),
            enabled: normalize_names(enabled).into_iter().collect(),
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(&config.classes, &config.toggled)
    }

    /// `configured ∩ enabled`, in catalogue order.
    pub fn active_classes(&self) -> IndexSet<String> {
        self.configured
            .iter()
            .filter(|name| self.enabled.contains(name.as_str()))
            .cloned()
            .collect()
    }

    /// Apply `action` to every matching node in `host`.
    ///
    /// - `Disable` / `Enable` set every target's flag to true / false.
    /// - `Toggle` disables everything if any target is currently enabled,
    ///   and enables everything only when all targets are already disabled.
    ///
    /// Targets already in the requested state are left alone. A target that
    /// refuses the write is logged and skipped; the rest of the batch still
    /// runs. All writes share one undo group, opened on the first change.
    ///
    /// # Errors
    /// Only a failing target lookup is an error; it is returned unchanged.
    pub fn apply<H: SceneHost>(&self, host: &H, action: ApplyAction) -> Result<ApplyResult, HostError> {
        let active = self.active_classes();
        if active.is_empty() {
            tracing::info!("No configured/toggled classes for heavy-node operations.");
            return Ok(ApplyResult::noop(NoopReason::NoActiveClasses));
        }

        let mut targets = host.find_targets(&active)?;
        if targets.is_empty() {
            tracing::info!("No nodes found for {} active classes.", active.len());
            return Ok(ApplyResult::noop(NoopReason::NoMatchingNodes));
        }

        let target_disable = match action {
            ApplyAction::Disable => true,
            ApplyAction::Enable => false,
            ApplyAction::Toggle => targets.iter().any(|t| !t.is_disabled()),
        };

        let mut undo = UndoScope::new(host, undo_label(target_disable));
        let mut changed = 0;
        let mut failed = 0;

        for target in targets.iter_mut() {
            if target.is_disabled() == target_disable {
                continue;
            }

            undo.ensure_open();
            match target.set_disabled(target_disable) {
                Ok(()) => changed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        "Failed to set disable on {} ({}): {}",
                        target.name(),
                        target.class_name(),
                        e
                    );
                }
            }
        }
        drop(undo);

        let total = targets.len();
        tracing::info!(
            "Heavy nodes {}: changed {} of {} ({} failed)",
            if target_disable { "disabled" } else { "enabled" },
            changed,
            total,
            failed
        );

        Ok(ApplyResult::applied(target_disable, changed, total, failed))
    }
}

/// Enable (`true`) or disable (`false`) every active heavy node.
pub fn heavy_nodes<H: SceneHost>(
    config: &OptimizerConfig,
    host: &H,
    enable: bool,
) -> Result<ApplyResult, HostError> {
    let action = if enable {
        ApplyAction::Enable
    } else {
        ApplyAction::Disable
    };
    HeavyNodeApplier::from_config(config).apply(host, action)
}

/// Toggle every active heavy node based on the current scene state.
pub fn toggle_heavy_nodes<H: SceneHost>(
    config: &OptimizerConfig,
    host: &H,
) -> Result<ApplyResult, HostError> {
    HeavyNodeApplier::from_config(config).apply(host, ApplyAction::Toggle)
}
