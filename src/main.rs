//! nodeopt - Heavy Node Optimizer command line
//!
//! Manages the optimizer's class list (the same `config.json` the editor
//! uses) and runs the bulk enable/disable/toggle against a JSON scene
//! snapshot.
//!
//! # Execution Flow
//!
//! 1. Parse arguments
//! 2. Load settings (defaults, optional settings file, `NODEOPT_*` env)
//! 3. Initialize logging (console, plus the rolling file with `--log`)
//! 4. Load the class list from `<config-dir>/config.json`
//! 5. Run the command and save the list if it changed
//!
//! # Examples
//!
//! ```text
//! nodeopt list
//! nodeopt add Kronos OFlow2
//! nodeopt uncheck --all
//! nodeopt apply toggle --scene shot010.json
//! nodeopt export presets/heavy.csv
//! ```

use anyhow::{Context, Result};
use camino::Utf8Path;
use clap::Parser;
use nodeopt::cli::{Args, Command, Selection};
use nodeopt::host::{MemoryScene, SceneHost};
use nodeopt::services::{Preset, export_preset, import_preset};
use nodeopt::state::CheckState;
use nodeopt::ui::format_result;
use nodeopt::{APP_NAME, ConfigManager, HeavyNodeApplier, Settings, StateManager, VERSION};
use std::fs;

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.settings.as_deref())?;
    let debug = settings.debug || args.verbosity >= 2;

    // The guard must outlive every log call
    let _log_guard = if args.log {
        Some(nodeopt::logging::setup_logging(
            &settings.resolved_log_dir(),
            debug,
            true,
        )?)
    } else {
        nodeopt::logging::setup_console_logging(args.verbosity)?;
        None
    };

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(|| settings.resolved_config_dir());
    let config_manager = ConfigManager::new(&config_dir);

    run(args.command, &config_manager)
}

fn run(command: Command, config_manager: &ConfigManager) -> Result<()> {
    let state = StateManager::new();
    state.load_from_config(&config_manager.safe_load_or_default());

    let changed = match command {
        Command::List => {
            print_list(&state);
            false
        }

        Command::Add { names } => add_classes(&state, &names),

        Command::Remove { names } => {
            let (outcome, _) = state.remove_classes(&names);
            println!("Removed {} of {} requested.", outcome.removed, names.len());
            outcome.changed
        }

        Command::Check(selection) => set_checked(&state, selection, true),

        Command::Uncheck(selection) => set_checked(&state, selection, false),

        Command::Reset => {
            state.reset_to_defaults();
            println!("Defaults restored ({} classes).", state.read(|s| s.classes.len()));
            true
        }

        Command::Export { path } => {
            let preset = Preset::from_config(&state.to_config());
            export_preset(&path, &preset)
                .with_context(|| format!("Could not export preset to {}", path))?;
            println!("Preset exported to {}.", path);
            false
        }

        Command::Import { path } => {
            let preset = import_preset(&path)
                .with_context(|| format!("Could not import preset from {}", path))?;
            state.replace_classes(&preset.classes, &preset.toggled);
            println!("Imported preset ({} classes).", preset.classes.len());
            true
        }

        Command::Stats { scene } => {
            let scene = load_scene(&scene)?;
            let classes = state.read(|s| s.classes.as_list());
            let stats = scene.class_stats(&classes)?;
            state.set_stats(stats);
            print_list(&state);
            false
        }

        Command::AddSelected { scene } => {
            let scene = load_scene(&scene)?;
            let selected = scene.selected_class_names()?;
            if selected.is_empty() {
                println!("No nodes selected.");
                false
            } else {
                add_classes(&state, &selected)
            }
        }

        Command::Apply {
            action,
            scene: scene_path,
            dry_run,
        } => {
            let scene = load_scene(&scene_path)?;
            let result = HeavyNodeApplier::from_config(&state.to_config()).apply(&scene, action)?;
            println!("{}", format_result(&result));
            if result.failed > 0 {
                println!("{} nodes could not be changed.", result.failed);
            }

            if dry_run {
                println!("Dry run: {} not written.", scene_path);
            } else if result.changed > 0 {
                save_scene(&scene, &scene_path)?;
            }
            false
        }
    };

    if changed {
        config_manager
            .save(&state.to_config())
            .with_context(|| format!("Could not write config {}", config_manager.config_path()))?;
        tracing::info!("Saved {}", config_manager.config_path());
    }

    Ok(())
}

fn print_list(state: &StateManager) {
    state.read(|s| {
        for name in s.classes.iter() {
            let mark = if s.is_checked(name) { "x" } else { " " };
            let label = s
                .stats
                .get(name)
                .map_or_else(|| name.clone(), |stats| stats.label(name));
            println!("[{}] {}", mark, label);
        }
        println!("{}/{} enabled", s.enabled_count(), s.classes.len());
    });
}

fn add_classes(state: &StateManager, names: &[String]) -> bool {
    let mut added = 0;
    for name in names {
        match state.add_class(name) {
            Ok(_) => added += 1,
            Err(e) => println!("Skipped '{}': {}", name, e.code()),
        }
    }
    println!("Added {} {}.", added, if added == 1 { "class" } else { "classes" });
    added > 0
}

fn set_checked(state: &StateManager, selection: Selection, checked: bool) -> bool {
    let changes = if selection.all {
        let target = if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        };
        state.set_all_checked(target)
    } else {
        let mut changes = Vec::new();
        for name in &selection.names {
            if !state.read(|s| s.classes.contains(name)) {
                println!("Skipped '{}': not in the list", name);
                continue;
            }
            changes.extend(state.set_checked(name, checked));
        }
        changes
    };

    println!(
        "{}/{} enabled",
        state.read(|s| s.enabled_count()),
        state.read(|s| s.classes.len())
    );
    !changes.is_empty()
}

fn load_scene(path: &Utf8Path) -> Result<MemoryScene> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read scene file: {}", path))?;
    MemoryScene::from_json(&json).with_context(|| format!("Failed to parse scene file: {}", path))
}

fn save_scene(scene: &MemoryScene, path: &Utf8Path) -> Result<()> {
    let json = scene.to_json().context("Failed to serialize scene")?;
    fs::write(path, json).with_context(|| format!("Failed to write scene file: {}", path))?;
    tracing::info!("Wrote scene {}", path);
    Ok(())
}
