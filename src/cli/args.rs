//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keep exactly one `WireGuard` profile enabled and running under systemd
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Args {
    /// Override config directory (default: platform config dir, honors `XDG_CONFIG_HOME` and sudo)
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        env = "WGSWITCH_CONFIG_DIR",
        global = true
    )]
    pub config_dir: Option<PathBuf>,

    /// Answer yes when asked to replace the enabled profile
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Fetch a fresh profile set, backing up the current one
    #[command(visible_alias = "g")]
    Get,
    /// List available profiles
    #[command(visible_alias = "l")]
    List,
    /// List country codes of available profiles
    #[command(visible_alias = "c")]
    Cc,
    /// Rank a country's profiles by endpoint latency
    #[command(visible_alias = "p")]
    Ping {
        /// Country code, e.g. `us`
        country_code: String,
    },
    /// Show the enabled profile and whether it is running
    #[command(visible_alias = "w")]
    Which,
    /// Enable a profile for auto-start without starting it
    #[command(visible_alias = "e")]
    Enable {
        /// Profile name, e.g. `us1`
        name: String,
    },
    /// Start the enabled profile, or enable and start NAME
    #[command(visible_alias = "a")]
    Start {
        /// Profile to use when none is enabled
        name: Option<String>,
    },
    /// Restart the enabled profile, or enable and start NAME
    #[command(visible_alias = "r")]
    Restart {
        /// Profile to use when none is enabled
        name: Option<String>,
    },
    /// Replace the enabled profile with NAME and start it
    #[command(visible_alias = "i")]
    Switch {
        /// Profile name, e.g. `us2`
        name: String,
    },
    /// Stop the running profile, keeping it enabled
    #[command(visible_alias = "o")]
    Stop,
    /// Disable the enabled profile, stopping it if running
    #[command(visible_alias = "d")]
    Disable,
}

impl Commands {
    /// Whether the command changes supervisor or filesystem state.
    pub const fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::List | Self::Cc | Self::Ping { .. } | Self::Which
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("wgswitch").chain(argv.iter().copied()))
    }

    #[test]
    fn test_command_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_single_letter_aliases() {
        let cases = [
            (vec!["g"], Commands::Get),
            (vec!["l"], Commands::List),
            (vec!["c"], Commands::Cc),
            (
                vec!["p", "us"],
                Commands::Ping {
                    country_code: "us".into(),
                },
            ),
            (vec!["w"], Commands::Which),
            (vec!["e", "us1"], Commands::Enable { name: "us1".into() }),
            (vec!["a"], Commands::Start { name: None }),
            (
                vec!["r", "ca1"],
                Commands::Restart {
                    name: Some("ca1".into()),
                },
            ),
            (vec!["i", "us2"], Commands::Switch { name: "us2".into() }),
            (vec!["o"], Commands::Stop),
            (vec!["d"], Commands::Disable),
        ];
        for (argv, expected) in cases {
            assert_eq!(parse(&argv).unwrap().command, expected, "argv: {argv:?}");
        }
    }

    #[test]
    fn test_full_names() {
        assert_eq!(
            parse(&["switch", "se4"]).unwrap().command,
            Commands::Switch { name: "se4".into() }
        );
        assert_eq!(
            parse(&["start", "us1"]).unwrap().command,
            Commands::Start {
                name: Some("us1".into()),
            }
        );
    }

    #[test]
    fn test_global_flags() {
        let args = parse(&["enable", "us1", "-y", "-v", "-C", "/tmp/wgswitch"]).unwrap();
        assert!(args.yes);
        assert!(args.verbose);
        assert_eq!(args.config_dir, Some(PathBuf::from("/tmp/wgswitch")));
    }

    #[test]
    fn test_missing_or_unknown_command_is_rejected() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
        assert!(parse(&["enable"]).is_err());
        assert!(parse(&["ping"]).is_err());
    }

    #[test]
    fn test_is_mutating() {
        assert!(Commands::Get.is_mutating());
        assert!(Commands::Stop.is_mutating());
        assert!(!Commands::Which.is_mutating());
        let ping = Commands::Ping {
            country_code: "us".into(),
        };
        assert!(!ping.is_mutating());
    }
}
