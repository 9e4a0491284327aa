//! Application configuration management.
//!
//! Handles config directory resolution (CLI flag > `SUDO_USER`-aware home > XDG > default)
//! and loading `config.toml`. wgswitch normally runs under sudo, so files it
//! creates in the invoking user's home are handed back to that user.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;

/// User-configurable application settings.
///
/// All fields have defaults. Users can override any subset via
/// `config.toml` in the config directory -- missing fields use defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Flat directory holding `<name>-wireguard.conf` profiles.
    pub profile_dir: PathBuf,
    /// systemd directory whose `wg-quick*` symlinks mark the enabled profile.
    pub autostart_dir: PathBuf,
    /// Name-resolution unit restarted after transitions.
    pub resolver_service: String,
    /// Profile synchronization tool; receives the output directory as its last argument.
    pub sync_command: String,
    /// Extra arguments passed to the sync tool before the output directory.
    pub sync_args: Vec<String>,
    /// Echo requests sent per latency probe.
    pub ping_count: u32,
    /// Per-reply ping timeout in seconds.
    pub ping_timeout: u64,
    /// Minimum log level echoed to stderr (`"debug"`, `"info"`, `"warning"`, `"error"`).
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile_dir: PathBuf::from(constants::DEFAULT_PROFILE_DIR),
            autostart_dir: PathBuf::from(constants::DEFAULT_AUTOSTART_DIR),
            resolver_service: constants::DEFAULT_RESOLVER_SERVICE.to_string(),
            sync_command: constants::DEFAULT_SYNC_COMMAND.to_string(),
            sync_args: Vec::new(),
            ping_count: constants::DEFAULT_PING_COUNT,
            ping_timeout: constants::DEFAULT_PING_TIMEOUT,
            log_level: constants::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Directory where sync tool logs are kept.
    pub fn logs_dir(config_dir: &Path) -> PathBuf {
        config_dir.join(constants::LOGS_DIR_NAME)
    }
}

/// Resolves the config directory path.
///
/// Precedence: CLI flag / `WGSWITCH_CONFIG_DIR` > `SUDO_USER`-aware home >
/// `XDG_CONFIG_HOME` > default.
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined or created.
pub fn resolve_config_dir(cli_override: Option<&PathBuf>) -> std::io::Result<PathBuf> {
    let path = if let Some(dir) = cli_override {
        if dir.is_relative() {
            std::env::current_dir()?.join(dir)
        } else {
            dir.clone()
        }
    } else {
        default_config_dir()?
    };

    if !path.exists() {
        // Track which ancestors already exist so we only chown dirs we create.
        let first_existing_ancestor = path.ancestors().find(|a| a.exists());
        std::fs::create_dir_all(&path)?;
        if crate::utils::is_root() {
            let mut dir = Some(path.as_path());
            while let Some(d) = dir {
                if first_existing_ancestor.is_some_and(|a| a == d) {
                    break;
                }
                fix_ownership(d);
                dir = d.parent();
            }
        }
    }

    std::fs::canonicalize(&path)
}

/// Computes the default config directory (no CLI override).
fn default_config_dir() -> std::io::Result<PathBuf> {
    let home = real_user_home().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "Home directory not found")
    })?;

    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let xdg_path = PathBuf::from(xdg);
        if xdg_path.is_absolute() {
            return Ok(xdg_path.join(constants::APP_NAME));
        }
    }

    Ok(home.join(".config").join(constants::APP_NAME))
}

/// Resolves the real user's home directory, accounting for sudo.
///
/// When running as root via `sudo`, `$HOME` points to `/root`. This checks
/// `SUDO_USER` and looks up that user's home from `/etc/passwd` instead.
fn real_user_home() -> Option<PathBuf> {
    if crate::utils::is_root() {
        if let Ok(sudo_user) = std::env::var("SUDO_USER") {
            return home_dir_for_user(&sudo_user);
        }
    }
    dirs::home_dir()
}

/// Looks up a user's home directory from `/etc/passwd` via `getpwnam`.
#[cfg(unix)]
#[allow(unsafe_code)]
fn home_dir_for_user(username: &str) -> Option<PathBuf> {
    use std::ffi::{CStr, CString};
    let c_name = CString::new(username).ok()?;
    // SAFETY: getpwnam returns a pointer to a static struct. We copy the
    // home directory string immediately so the pointer is not held.
    unsafe {
        let pw = libc::getpwnam(c_name.as_ptr());
        if pw.is_null() {
            return None;
        }
        let home = CStr::from_ptr((*pw).pw_dir);
        home.to_str().ok().map(PathBuf::from)
    }
}

#[cfg(not(unix))]
fn home_dir_for_user(_username: &str) -> Option<PathBuf> {
    None
}

/// Loads `AppConfig` from `config.toml` in the given directory.
///
/// Returns defaults if the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(config_dir: &Path) -> Result<AppConfig, String> {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);

    if !config_path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(&config_path)
        .map_err(|e| format!("Failed to read {}: {e}", config_path.display()))?;

    toml::from_str(&content)
        .map_err(|e| format!("Invalid config at {}: {e}", config_path.display()))
}

/// Ensure a path (file or directory) is owned by the real user, not root.
///
/// No-op when not running as root.
pub fn fix_ownership(path: &Path) {
    if !crate::utils::is_root() {
        return;
    }
    if let Err(e) = chown_to_real_user(path) {
        crate::log_debug!(
            "CONFIG",
            "Could not set ownership of {} to the invoking user: {e}",
            path.display()
        );
    }
}

/// Chowns a path to `SUDO_UID`:`SUDO_GID`.
#[cfg(unix)]
#[allow(unsafe_code)]
fn chown_to_real_user(path: &Path) -> std::io::Result<()> {
    use std::os::unix::ffi::OsStrExt;

    let uid: u32 = std::env::var("SUDO_UID")
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "SUDO_UID not set"))?;
    let gid: u32 = std::env::var("SUDO_GID")
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, "SUDO_GID not set"))?;

    let c_path = std::ffi::CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // SAFETY: chown is a standard POSIX call with no side effects beyond
    // changing file ownership. The CString is valid for the duration of the call.
    let ret = unsafe { libc::chown(c_path.as_ptr(), uid, gid) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
fn chown_to_real_user(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
