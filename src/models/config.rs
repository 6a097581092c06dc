use super::class_list::normalize_names;
use super::defaults::RENDER_INTENSIVE_NODES;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Schema version of the persisted config file.
///
/// Bump when the shape or meaning of the JSON changes incompatibly. Files
/// with an older version are reset to defaults on load.
pub const CONFIG_VERSION: i64 = 1;

/// Persisted optimizer configuration.
///
/// ```json
/// { "version": 1, "classes": ["Kronos", "Defocus"], "toggled": ["Defocus"] }
/// ```
///
/// `toggled` must stay a subset of `classes`; [`normalized`](Self::normalized)
/// enforces it and is applied on every load and save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub version: i64,

    pub classes: Vec<String>,

    #[serde(default)]
    pub toggled: Vec<String>,
}

impl OptimizerConfig {
    /// Build a record at the current schema version.
    pub fn new<C, T, S1, S2>(classes: C, toggled: T) -> Self
    where
        C: IntoIterator<Item = S1>,
        T: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            version: CONFIG_VERSION,
            classes: classes.into_iter().map(|s| s.as_ref().to_string()).collect(),
            toggled: toggled.into_iter().map(|s| s.as_ref().to_string()).collect(),
        }
        .normalized()
    }

    /// Factory defaults: every built-in heavy class, all of them checked.
    pub fn factory_defaults() -> Self {
        Self::new(RENDER_INTENSIVE_NODES, RENDER_INTENSIVE_NODES)
    }

    /// Trim and dedupe both lists and drop toggled entries that are not
    /// catalogued. Toggled entries follow class order.
    pub fn normalized(mut self) -> Self {
        self.classes = normalize_names(&self.classes);
        let toggled: IndexSet<String> = normalize_names(&self.toggled).into_iter().collect();
        self.toggled = self
            .classes
            .iter()
            .filter(|name| toggled.contains(name.as_str()))
            .cloned()
            .collect();
        self
    }

    /// Classes that are both catalogued and checked.
    pub fn active_classes(&self) -> IndexSet<String> {
        let toggled: IndexSet<&str> = self.toggled.iter().map(String::as_str).collect();
        self.classes
            .iter()
            .filter(|name| toggled.contains(name.as_str()))
            .cloned()
            .collect()
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::factory_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_uncatalogued_toggles() {
        let config = OptimizerConfig::new(["Kronos", "Defocus"], ["Defocus", "Blur", " Kronos"]);

        assert_eq!(config.classes, vec!["Kronos", "Defocus"]);
        assert_eq!(config.toggled, vec!["Kronos", "Defocus"]);
    }

    #[test]
    fn test_factory_defaults_all_checked() {
        let config = OptimizerConfig::factory_defaults();

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.classes.len(), RENDER_INTENSIVE_NODES.len());
        assert_eq!(config.toggled, config.classes);
        assert_eq!(config.classes[0], "Kronos");
    }

    #[test]
    fn test_active_classes() {
        let config = OptimizerConfig::new(["Kronos", "Defocus"], ["Defocus"]);
        let active = config.active_classes();

        assert_eq!(active.len(), 1);
        assert!(active.contains("Defocus"));
    }

    #[test]
    fn test_toggled_defaults_to_empty_when_missing() {
        let config: OptimizerConfig =
            serde_json::from_str(r#"{"version": 1, "classes": ["Kronos"]}"#).unwrap();
        assert!(config.toggled.is_empty());
    }
}
