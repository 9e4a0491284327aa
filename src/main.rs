//! # wgswitch
//!
//! Keeps exactly one `WireGuard` profile enabled and running under systemd.
//! Profiles are `<name>-wireguard.conf` files in one directory; each is run by
//! the templated `wg-quick@<name>-wireguard.service` unit.
//!
//! ## Modules
//! - [`cli`]: Command-line argument parsing and handlers.
//! - [`config`]: Configuration management.
//! - [`core`]: Profile lifecycle, active-profile tracking and diagnostics.
//! - [`platform`]: systemd and ping behind traits.
//! - [`vpn`]: Profile store and profile synchronization.

mod cli;
mod config;
mod constants;
mod core;
mod error;
mod logger;
mod platform;
mod state;
mod utils;
mod vpn;

use clap::Parser;
use cli::args::Args;
use cli::commands::Context;
use color_eyre::Result;

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse arguments
    let args = Args::parse();

    // Resolve config directory (CLI flag > SUDO_USER > XDG > default)
    let config_dir = config::resolve_config_dir(args.config_dir.as_ref())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to resolve config directory: {e}"))?;

    // Load config.toml (or use defaults)
    let app_config = match config::load_config(&config_dir) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}{e}", constants::CLI_MSG_ERROR);
            eprintln!();
            eprintln!("Fix the file or remove it to use defaults:");
            eprintln!("  rm {}/{}", config_dir.display(), constants::CONFIG_FILE_NAME);
            std::process::exit(1);
        }
    };

    let log_level = if args.verbose {
        "debug"
    } else {
        app_config.log_level.as_str()
    };
    logger::configure(log_level);
    log_debug!("CONFIG", "Using config dir {}", config_dir.display());

    cli::commands::handle_command(
        &args.command,
        &Context {
            config: &app_config,
            config_dir: &config_dir,
            assume_yes: args.yes,
        },
    );
    Ok(())
}
