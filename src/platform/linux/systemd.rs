//! systemd supervisor via `systemctl` and the auto-start wants directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::constants;
use crate::error::{Error, Result};
use crate::log_debug;
use crate::platform::{select_profile_unit, ServiceSupervisor};

/// Supervisor backed by the host's systemd.
pub struct Systemctl {
    autostart_dir: PathBuf,
}

impl Systemctl {
    pub fn new(autostart_dir: impl Into<PathBuf>) -> Self {
        Self {
            autostart_dir: autostart_dir.into(),
        }
    }

    /// Run a state-changing `systemctl` verb.
    fn run(action: &'static str, unit: &str) -> Result<()> {
        log_debug!("SUPERVISOR", "systemctl {action} {unit}");

        let output = Command::new("systemctl")
            .args([action, unit])
            .output()
            .map_err(|e| Error::SupervisorError {
                action,
                unit: unit.to_string(),
                message: format!("failed to run systemctl: {e}"),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::SupervisorError {
                action,
                unit: unit.to_string(),
                message: failure_message(
                    output.status,
                    &String::from_utf8_lossy(&output.stderr),
                ),
            })
        }
    }

    /// Run a `systemctl is-*` query; exit status 0 means yes.
    fn query(verb: &'static str, unit: &str) -> Result<bool> {
        Command::new("systemctl")
            .args([verb, "--quiet", unit])
            .status()
            .map(|status| status.success())
            .map_err(|e| Error::SupervisorError {
                action: verb,
                unit: unit.to_string(),
                message: format!("failed to run systemctl: {e}"),
            })
    }
}

impl ServiceSupervisor for Systemctl {
    fn enable(&self, unit: &str) -> Result<()> {
        Self::run("enable", unit)
    }

    fn disable(&self, unit: &str) -> Result<()> {
        Self::run("disable", unit)
    }

    fn start(&self, unit: &str) -> Result<()> {
        Self::run("start", unit)
    }

    fn stop(&self, unit: &str) -> Result<()> {
        Self::run("stop", unit)
    }

    fn restart(&self, unit: &str) -> Result<()> {
        Self::run("restart", unit)
    }

    fn is_enabled(&self, unit: &str) -> Result<bool> {
        Self::query("is-enabled", unit)
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        Self::query("is-active", unit)
    }

    fn currently_enabled_unit(&self) -> Result<Option<String>> {
        enabled_wg_units(&self.autostart_dir).map(|units| select_profile_unit(&units))
    }
}

/// Sorted names of the `wg-quick*` symlinks in the wants directory.
///
/// A missing directory means nothing is enabled.
pub fn enabled_wg_units(autostart_dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(autostart_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(Error::SupervisorError {
                action: "list",
                unit: autostart_dir.display().to_string(),
                message: e.to_string(),
            })
        }
    };

    let mut units: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_symlink()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(constants::AUTOSTART_UNIT_PATTERN))
        .collect();
    units.sort();
    Ok(units)
}

/// The supervisor's own diagnostic text, or the exit status when it printed nothing.
fn failure_message(status: ExitStatus, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exited with {status}")
    } else {
        stderr.to_string()
    }
}
