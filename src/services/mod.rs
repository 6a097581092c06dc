//! Services module - the optimizer's business logic.
//!
//! The services are framework-agnostic: they talk to the host only through
//! the traits in [`crate::host`] and never touch UI code.
//!
//! # Components
//!
//! - [`HeavyNodeApplier`]: decides and applies one uniform enable/disable
//!   state across the scene's heavy nodes, inside a single undo group.
//! - [`presets`]: JSON and CSV import/export of the class catalogue.
//!
//! # Usage Example
//!
//! ```ignore
//! use nodeopt::services::HeavyNodeApplier;
//! use nodeopt::models::ApplyAction;
//!
//! let applier = HeavyNodeApplier::from_config(&config);
//! let result = applier.apply(&scene, ApplyAction::Toggle)?;
//! println!("{} changed of {}", result.changed, result.total);
//! ```

pub mod applier;
pub mod presets;

pub use applier::{HeavyNodeApplier, heavy_nodes, toggle_heavy_nodes, undo_label};
pub use presets::{
    Preset, PresetError, PresetFormat, export_preset, import_preset, parse_csv_preset,
    parse_json_preset, render_json_preset, write_csv_preset,
};
