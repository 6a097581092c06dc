// Heavy Node Optimizer - mark heavy node classes and bulk enable/disable them
//
// This is the library crate containing the class list model, persistence,
// the bulk apply logic and the host seams. The binary crate (main.rs)
// provides a command-line front end over a scene snapshot file.

pub mod cli;
pub mod config;
pub mod debounce;
pub mod host;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, Settings};
pub use models::{ApplyAction, ApplyResult, ClassListModel, OptimizerConfig};
pub use services::HeavyNodeApplier;
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
