use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bulk action requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyAction {
    Enable,
    Disable,
    /// Disable everything if any target is enabled, else enable everything.
    Toggle,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action '{0}' (expected enable, disable or toggle)")]
pub struct UnknownAction(pub String);

impl FromStr for ApplyAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enable" => Ok(ApplyAction::Enable),
            "disable" => Ok(ApplyAction::Disable),
            "toggle" => Ok(ApplyAction::Toggle),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// State that was applied to the targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedState {
    Enabled,
    Disabled,
    Noop,
}

impl fmt::Display for AppliedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedState::Enabled => write!(f, "enabled"),
            AppliedState::Disabled => write!(f, "disabled"),
            AppliedState::Noop => write!(f, "noop"),
        }
    }
}

/// Why an apply did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoopReason {
    /// No class is both catalogued and checked.
    NoActiveClasses,
    /// Active classes exist but the scene has no matching nodes.
    NoMatchingNodes,
}

impl NoopReason {
    pub fn code(&self) -> &'static str {
        match self {
            NoopReason::NoActiveClasses => "no_active_classes",
            NoopReason::NoMatchingNodes => "no_matching_nodes",
        }
    }
}

/// Outcome of one bulk apply.
///
/// `changed < total` means some targets were already in the requested
/// state or refused the write; `failed` counts the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub action: AppliedState,
    pub changed: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NoopReason>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl ApplyResult {
    pub fn noop(reason: NoopReason) -> Self {
        Self {
            action: AppliedState::Noop,
            changed: 0,
            total: 0,
            failed: 0,
            reason: Some(reason),
        }
    }

    pub fn applied(disabled: bool, changed: usize, total: usize, failed: usize) -> Self {
        Self {
            action: if disabled {
                AppliedState::Disabled
            } else {
                AppliedState::Enabled
            },
            changed,
            total,
            failed,
            reason: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.action == AppliedState::Noop
    }
}
