use crate::models::{OptimizerConfig, normalize_json_names, normalize_names};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use serde_json::Value;
use std::fs;
use std::io;
use thiserror::Error;

/// Truthy spellings accepted in the CSV `toggled` column.
const CSV_TRUTHY: [&str; 4] = ["1", "true", "yes", "y"];

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("CSV file is empty.")]
    Empty,

    #[error("JSON preset must be a list or an object with a 'classes' key.")]
    InvalidShape,

    #[error("'classes' must be a list of strings.")]
    ClassesNotStrings,

    #[error("Could not access preset {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Preset file format, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetFormat {
    Json,
    Csv,
}

impl PresetFormat {
    /// `.csv` (any case) is CSV; everything else is JSON.
    pub fn from_path(path: &Utf8Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => PresetFormat::Csv,
            _ => PresetFormat::Json,
        }
    }
}

/// A class catalogue and its checked subset, as exchanged through files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preset {
    pub classes: Vec<String>,
    pub toggled: IndexSet<String>,
}

impl Preset {
    /// Normalize both lists and keep `toggled` within `classes`.
    pub fn new<C, T, S1, S2>(classes: C, toggled: T) -> Self
    where
        C: IntoIterator<Item = S1>,
        T: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let classes = normalize_names(classes);
        let wanted: IndexSet<String> = normalize_names(toggled).into_iter().collect();
        let toggled = classes
            .iter()
            .filter(|name| wanted.contains(name.as_str()))
            .cloned()
            .collect();
        Self { classes, toggled }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(&config.classes, &config.toggled)
    }

    pub fn to_config(&self) -> OptimizerConfig {
        OptimizerConfig::new(&self.classes, &self.toggled)
    }

    pub fn is_toggled(&self, name: &str) -> bool {
        self.toggled.contains(name)
    }
}

/// Parse a JSON preset.
///
/// Accepts `{"classes": [...], "toggled": [...]}` (both optional) or a bare
/// list of class names, which imports with nothing checked.
pub fn parse_json_preset(text: &str) -> Result<Preset, PresetError> {
    let value: Value = serde_json::from_str(text)?;

    let (raw_classes, raw_toggled) = match &value {
        Value::Object(obj) => (
            obj.get("classes").cloned().unwrap_or(Value::Array(Vec::new())),
            obj.get("toggled").cloned().unwrap_or(Value::Null),
        ),
        Value::Array(_) => (value.clone(), Value::Null),
        _ => return Err(PresetError::InvalidShape),
    };

    let classes = raw_classes
        .as_array()
        .filter(|items| items.iter().all(Value::is_string))
        .ok_or(PresetError::ClassesNotStrings)?;

    Ok(Preset::new(
        classes.iter().filter_map(Value::as_str),
        normalize_json_names(&raw_toggled),
    ))
}

/// Parse a CSV preset.
///
/// With a header row naming a `class` column (and optionally `toggled`),
/// columns are looked up by name. Without one, the first column of every
/// row is a class name and nothing is checked.
pub fn parse_csv_preset(text: &str) -> Result<Preset, PresetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let Some(first) = rows.first() else {
        return Err(PresetError::Empty);
    };

    let header: Vec<String> = first.iter().map(|h| h.trim().to_lowercase()).collect();
    let Some(idx_class) = header.iter().position(|h| h == "class") else {
        let classes = rows.iter().filter_map(|row| row.first());
        return Ok(Preset::new(classes, Vec::<String>::new()));
    };
    let idx_toggle = header.iter().position(|h| h == "toggled");

    let mut classes = Vec::new();
    let mut toggled = Vec::new();
    for row in &rows[1..] {
        let Some(name) = row.get(idx_class).map(|s| s.trim()) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        classes.push(name.to_string());

        let flag = idx_toggle
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim().to_lowercase());
        if flag.is_some_and(|f| CSV_TRUTHY.contains(&f.as_str())) {
            toggled.push(name.to_string());
        }
    }

    Ok(Preset::new(classes, toggled))
}

/// Serialize as `{version, classes, toggled}` pretty JSON.
pub fn render_json_preset(preset: &Preset) -> Result<String, PresetError> {
    Ok(serde_json::to_string_pretty(&preset.to_config())?)
}

/// Write the `class,toggled` CSV form (`1`/`0` flags).
pub fn write_csv_preset<W: io::Write>(writer: W, preset: &Preset) -> Result<(), PresetError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["class", "toggled"])?;
    for name in &preset.classes {
        let flag = if preset.is_toggled(name) { "1" } else { "0" };
        wtr.write_record([name.as_str(), flag])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Read a preset file; the format follows the extension.
pub fn import_preset(path: &Utf8Path) -> Result<Preset, PresetError> {
    let text = fs::read_to_string(path).map_err(|source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let preset = match PresetFormat::from_path(path) {
        PresetFormat::Csv => parse_csv_preset(&text)?,
        PresetFormat::Json => parse_json_preset(&text)?,
    };

    tracing::info!(
        "Imported preset {} ({} classes, {} toggled)",
        path,
        preset.classes.len(),
        preset.toggled.len()
    );
    Ok(preset)
}

/// Write a preset file; the format follows the extension.
pub fn export_preset(path: &Utf8Path, preset: &Preset) -> Result<(), PresetError> {
    let io_err = |source| PresetError::Io {
        path: path.to_path_buf(),
        source,
    };

    match PresetFormat::from_path(path) {
        PresetFormat::Csv => {
            let file = fs::File::create(path).map_err(io_err)?;
            write_csv_preset(file, preset)?;
        }
        PresetFormat::Json => {
            fs::write(path, render_json_preset(preset)?).map_err(io_err)?;
        }
    }

    tracing::info!("Exported preset {} ({} classes)", path, preset.classes.len());
    Ok(())
}
