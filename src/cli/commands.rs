//! CLI command handlers.

use std::path::Path;

use crate::cli::args::Commands;
use crate::config::AppConfig;
use crate::constants;
use crate::core::prompt::{AssumeYes, Confirm, LinePrompt};
use crate::core::{ActiveProfileTracker, DiagnosticsReporter, LifecycleController, Measurement};
use crate::error::{Error, Result};
use crate::log_warning;
use crate::platform::linux::ping::PingProbe;
use crate::platform::linux::systemd::Systemctl;
use crate::state::{ResolverRestart, TransitionReport};
use crate::vpn::sync::{self, SyncTool};
use crate::vpn::ProfileStore;

/// Resolved settings a command runs against.
pub struct Context<'a> {
    pub config: &'a AppConfig,
    pub config_dir: &'a Path,
    pub assume_yes: bool,
}

/// Runs one command. Any failure is printed as `Error: <message>` and exits with status 1.
pub fn handle_command(command: &Commands, ctx: &Context<'_>) {
    if command.is_mutating() && !crate::utils::is_root() {
        log_warning!(
            "SUPERVISOR",
            "Not running as root; systemctl and profile writes may be refused"
        );
    }

    if let Err(e) = run(command, ctx) {
        eprintln!("{}", error_line(&e));
        std::process::exit(1);
    }
}

/// The single line a failed command prints.
fn error_line(e: &Error) -> String {
    format!("{}{e}", constants::CLI_MSG_ERROR)
}

fn run(command: &Commands, ctx: &Context<'_>) -> Result<()> {
    let config = ctx.config;
    let store = ProfileStore::new(&config.profile_dir);
    let supervisor = Systemctl::new(&config.autostart_dir);
    let lifecycle = LifecycleController::new(&store, &supervisor, &config.resolver_service);

    match command {
        Commands::Get => handle_get(&store, ctx),
        Commands::List => handle_list(&store),
        Commands::Cc => handle_country_codes(&store),
        Commands::Ping { country_code } => handle_ping(&store, config, country_code),
        Commands::Which => handle_which(&ActiveProfileTracker::new(&supervisor)),
        Commands::Enable { name } => {
            let mut confirm: Box<dyn Confirm> = if ctx.assume_yes {
                Box::new(AssumeYes)
            } else {
                Box::new(LinePrompt::stdin())
            };
            let report = lifecycle.enable(name, confirm.as_mut())?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
        Commands::Start { name } => {
            let report = lifecycle.start(name.as_deref())?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
        Commands::Restart { name } => {
            let report = lifecycle.restart(name.as_deref())?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
        Commands::Switch { name } => {
            let report = lifecycle.switch(name)?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
        Commands::Stop => {
            let report = lifecycle.stop()?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
        Commands::Disable => {
            let report = lifecycle.disable()?;
            print_report(&report, &config.resolver_service);
            Ok(())
        }
    }
}

fn handle_get(store: &ProfileStore, ctx: &Context<'_>) -> Result<()> {
    let tool = SyncTool {
        command: ctx.config.sync_command.clone(),
        args: ctx.config.sync_args.clone(),
    };

    println!("{}", constants::CLI_MSG_SYNC_START);
    let summary = sync::sync_profiles(store, &tool, &AppConfig::logs_dir(ctx.config_dir))?;

    println!(
        "{}{} ({})",
        constants::CLI_MSG_SYNC_INSTALLED,
        summary.installed.len(),
        summary.installed.join(", ")
    );
    if let Some(backup) = &summary.backup_dir {
        println!("{}{}", constants::CLI_MSG_SYNC_BACKUP, backup.display());
    }
    for log in &summary.log_files {
        crate::log_info!("SYNC", "Tool log saved to {}", log.display());
    }
    Ok(())
}

fn handle_list(store: &ProfileStore) -> Result<()> {
    let profiles = store.list()?;
    if profiles.is_empty() {
        println!("{}{}", constants::CLI_MSG_NO_PROFILES, store.dir().display());
    }
    for name in profiles {
        println!("{name}");
    }
    Ok(())
}

fn handle_country_codes(store: &ProfileStore) -> Result<()> {
    let codes = store.country_codes()?;
    if codes.is_empty() {
        println!("{}{}", constants::CLI_MSG_NO_PROFILES, store.dir().display());
    }
    for code in codes {
        println!("{code}");
    }
    Ok(())
}

fn handle_ping(store: &ProfileStore, config: &AppConfig, code: &str) -> Result<()> {
    let probe = PingProbe::new(config.ping_count, config.ping_timeout);
    let reporter = DiagnosticsReporter::new(store, &probe);

    let ranking = reporter.latency_ranking(code, |m| println!("{}", format_measurement(m)))?;

    println!("{}", constants::CLI_MSG_PING_HEADER);
    for entry in ranking {
        println!("  {:<16} {:>8.1} ms", entry.profile, entry.latency_ms);
    }
    Ok(())
}

fn handle_which<S: crate::platform::ServiceSupervisor>(
    tracker: &ActiveProfileTracker<'_, S>,
) -> Result<()> {
    match tracker.snapshot()? {
        Some(profile) => {
            let status = if profile.active {
                constants::CLI_MSG_STATUS_ACTIVE
            } else {
                constants::CLI_MSG_STATUS_INACTIVE
            };
            println!("{}{} ({status})", constants::CLI_MSG_ENABLED, profile.name);
        }
        None => println!("{}", constants::CLI_MSG_NONE_ENABLED),
    }
    Ok(())
}

fn format_measurement(m: &Measurement) -> String {
    let host = m.host.as_deref().unwrap_or("?");
    match m.latency_ms {
        Some(ms) => format!("  {:<16} {host:<40} {ms:>8.1} ms", m.profile),
        None => format!(
            "  {:<16} {host:<40} {}",
            m.profile,
            constants::CLI_MSG_PING_UNREACHABLE
        ),
    }
}

fn print_report(report: &TransitionReport, resolver: &str) {
    for step in &report.steps {
        println!("  {step}");
    }
    if let Some(line) = resolver_line(&report.resolver, resolver) {
        println!("{line}");
    }
}

fn resolver_line(outcome: &ResolverRestart, resolver: &str) -> Option<String> {
    match outcome {
        ResolverRestart::NotRequested => None,
        ResolverRestart::Restarted => Some(format!(
            "{}{resolver}",
            constants::CLI_MSG_RESOLVER_RESTARTED
        )),
        ResolverRestart::Skipped => Some(format!(
            "{}{resolver}{}",
            constants::CLI_MSG_RESOLVER_SKIPPED,
            constants::CLI_MSG_RESOLVER_SKIPPED_SUFFIX
        )),
        ResolverRestart::Failed(reason) => Some(format!(
            "{}{resolver}: {reason}",
            constants::CLI_MSG_RESOLVER_FAILED
        )),
    }
}
