use indexmap::IndexSet;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Reason a class name was rejected by [`ClassListModel::add`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddError {
    #[error("class name is not a string")]
    Type,

    #[error("class name is empty")]
    Empty,

    #[error("class already exists")]
    Exists,
}

impl AddError {
    /// Short machine-readable code (`"type"`, `"empty"`, `"exists"`).
    pub fn code(&self) -> &'static str {
        match self {
            AddError::Type => "type",
            AddError::Empty => "empty",
            AddError::Exists => "exists",
        }
    }

    /// Dialog title shown when an add is skipped for this reason.
    pub fn title(&self) -> &'static str {
        match self {
            AddError::Type => "Invalid class",
            AddError::Empty => "No class name",
            AddError::Exists => "Duplicate class",
        }
    }
}

/// Summary of a [`ClassListModel::remove`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: usize,
    pub changed: bool,
}

/// Trim, drop blanks, and dedupe keeping the first occurrence.
pub fn normalize_names<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = IndexSet::new();
    for value in values {
        let name = value.as_ref().trim();
        if !name.is_empty() && !seen.contains(name) {
            seen.insert(name.to_string());
        }
    }
    seen.into_iter().collect()
}

/// Like [`normalize_names`], but for untyped JSON input.
///
/// Anything that is not an array yields an empty list; non-string
/// array elements are skipped.
pub fn normalize_json_names(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => normalize_names(items.iter().filter_map(Value::as_str)),
        _ => Vec::new(),
    }
}

/// Ordered, duplicate-free list of node class names.
///
/// Insertion order is display order. Every entry is trimmed and
/// non-empty. The model does no I/O; persisting it is the job of
/// [`ConfigManager`](crate::config::ConfigManager).
#[derive(Debug, Clone, Default, Eq)]
pub struct ClassListModel {
    items: IndexSet<String>,
}

// Order is part of the value; IndexSet's own == ignores it
impl PartialEq for ClassListModel {
    fn eq(&self, other: &Self) -> bool {
        self.items.iter().eq(other.items.iter())
    }
}

impl ClassListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from arbitrary input, normalizing it.
    pub fn from_names<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut model = Self::new();
        model.replace_all(values);
        model
    }

    /// Current class names in display order.
    pub fn as_list(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains(name.trim())
    }

    /// Replace the whole collection.
    ///
    /// Returns `false` (and leaves the model untouched) when the normalized
    /// input matches the current contents and order exactly.
    pub fn replace_all<I, S>(&mut self, values: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let incoming = normalize_names(values);
        if incoming.len() == self.items.len()
            && incoming.iter().zip(self.items.iter()).all(|(a, b)| a == b)
        {
            return false;
        }

        self.items = incoming.into_iter().collect();
        true
    }

    /// Append one class name.
    pub fn add(&mut self, name: &str) -> Result<(), AddError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AddError::Empty);
        }
        if self.items.contains(name) {
            return Err(AddError::Exists);
        }
        self.items.insert(name.to_string());
        Ok(())
    }

    /// Append a class name coming from untyped input.
    pub fn add_value(&mut self, value: &Value) -> Result<(), AddError> {
        match value.as_str() {
            Some(name) => self.add(name),
            None => Err(AddError::Type),
        }
    }

    /// Remove every entry named in `names`; blank names are ignored.
    pub fn remove<I, S>(&mut self, names: I) -> RemoveOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: HashSet<String> = normalize_names(names).into_iter().collect();
        if targets.is_empty() {
            return RemoveOutcome::default();
        }

        let before = self.items.len();
        self.items.retain(|name| !targets.contains(name));
        let removed = before - self.items.len();

        RemoveOutcome {
            removed,
            changed: removed > 0,
        }
    }
}
