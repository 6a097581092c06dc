use crate::models::ApplyAction;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Mark heavy node classes and bulk enable/disable them in a scene
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding config.json (default: ~/.nuke/nuke_optimizer_data)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<Utf8PathBuf>,

    /// Settings file (.yaml, .toml or .json)
    #[arg(short = 's', long = "settings", value_name = "FILE")]
    pub settings: Option<Utf8PathBuf>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Also write the rolling optimizer.log file
    #[arg(short = 'l', long = "log")]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the class list; `[x]` marks checked classes
    List,

    /// Append classes (new classes start checked)
    Add {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Remove classes
    Remove {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Check classes
    Check(Selection),

    /// Uncheck classes
    Uncheck(Selection),

    /// Restore the factory default list, all checked
    Reset,

    /// Write the list to a preset (.json or .csv)
    Export { path: Utf8PathBuf },

    /// Replace the list with a preset (.json or .csv)
    Import { path: Utf8PathBuf },

    /// Per-class node counts in a scene snapshot
    Stats {
        #[arg(long, value_name = "FILE")]
        scene: Utf8PathBuf,
    },

    /// Add the classes of the selected nodes in a scene snapshot
    AddSelected {
        #[arg(long, value_name = "FILE")]
        scene: Utf8PathBuf,
    },

    /// Enable, disable or toggle every active heavy node in a scene snapshot
    Apply {
        #[arg(value_name = "enable|disable|toggle")]
        action: ApplyAction,

        #[arg(long, value_name = "FILE")]
        scene: Utf8PathBuf,

        /// Report what would change without writing the scene
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(clap::Args, Debug)]
pub struct Selection {
    #[arg(value_name = "NAME", required_unless_present = "all", conflicts_with = "all")]
    pub names: Vec<String>,

    /// Every class in the list
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let args = Args::try_parse_from([
            "nodeopt", "-vv", "apply", "toggle", "--scene", "shot.json", "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.verbosity, 2);
        match args.command {
            Command::Apply {
                action,
                scene,
                dry_run,
            } => {
                assert_eq!(action, ApplyAction::Toggle);
                assert_eq!(scene, Utf8PathBuf::from("shot.json"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_names_or_all() {
        assert!(Args::try_parse_from(["nodeopt", "check"]).is_err());
        assert!(Args::try_parse_from(["nodeopt", "check", "--all", "Kronos"]).is_err());

        let args = Args::try_parse_from(["nodeopt", "uncheck", "--all"]).unwrap();
        assert!(matches!(args.command, Command::Uncheck(Selection { all: true, .. })));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(Args::try_parse_from(["nodeopt", "apply", "flip", "--scene", "a.json"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let args =
            Args::try_parse_from(["nodeopt", "--config-dir", "/tmp/opt", "--log", "list"]).unwrap();
        assert_eq!(args.config_dir, Some(Utf8PathBuf::from("/tmp/opt")));
        assert!(args.log);
        assert!(matches!(args.command, Command::List));
    }
}
