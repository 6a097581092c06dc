//! Data models for the heavy node optimizer.
//!
//! - [`ClassListModel`]: ordered, duplicate-free list of heavy class names
//! - [`OptimizerConfig`]: the persisted `{version, classes, toggled}` record
//! - [`ApplyAction`] / [`ApplyResult`]: input and outcome of a bulk apply
//! - [`RENDER_INTENSIVE_NODES`]: factory default class list
//!
//! Nothing in here touches the filesystem or the host application.

pub mod apply;
pub mod class_list;
pub mod config;
pub mod defaults;

pub use apply::{ApplyAction, ApplyResult, AppliedState, NoopReason, UnknownAction};
pub use class_list::{AddError, ClassListModel, RemoveOutcome, normalize_json_names, normalize_names};
pub use config::{CONFIG_VERSION, OptimizerConfig};
pub use defaults::RENDER_INTENSIVE_NODES;
