//! Application-wide constants and configuration values.
//!
//! This module defines the static values used throughout wgswitch,
//! including naming conventions shared with `wg-quick` and systemd,
//! default paths, and operator-facing messages.

// === Application Metadata ===

/// Application name (from Cargo.toml).
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

// === Naming Conventions ===
// These must match wg-quick and systemd exactly.

/// Suffix of every profile definition file: `<name>-wireguard.conf`.
pub const PROFILE_FILE_SUFFIX: &str = "-wireguard.conf";
/// Prefix of the templated wg-quick unit.
pub const UNIT_PREFIX: &str = "wg-quick@";
/// Suffix of a profile's unit: `wg-quick@<name>-wireguard.service`.
pub const UNIT_SUFFIX: &str = "-wireguard.service";
/// Pattern prefix for enabled wg-quick symlinks in the autostart directory.
pub const AUTOSTART_UNIT_PATTERN: &str = "wg-quick";

// === Defaults ===
// AppConfig::default() references these so there is exactly one source of truth.

/// Default flat directory holding the profile definitions.
pub const DEFAULT_PROFILE_DIR: &str = "/etc/wireguard";
/// Default systemd directory listing units wanted by `multi-user.target`.
pub const DEFAULT_AUTOSTART_DIR: &str = "/etc/systemd/system/multi-user.target.wants";
/// Default name-resolution service restarted after transitions.
pub const DEFAULT_RESOLVER_SERVICE: &str = "systemd-resolved.service";
/// Default profile synchronization tool.
pub const DEFAULT_SYNC_COMMAND: &str = "mullvad-wg-fetch";
/// Default number of echo requests per latency probe.
pub const DEFAULT_PING_COUNT: u32 = 3;
/// Default timeout for each echo reply (seconds).
pub const DEFAULT_PING_TIMEOUT: u64 = 2;
/// Default minimum log level echoed to stderr.
pub const DEFAULT_LOG_LEVEL: &str = "warning";

// === Path Configuration ===

/// Name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Name of the logs subdirectory.
pub const LOGS_DIR_NAME: &str = "logs";
/// Staging directory (inside the profile dir) used while syncing.
pub const SYNC_STAGING_DIR_NAME: &str = ".wgswitch-staging";

// === Prompt ===

/// Override prompt shown when enabling over another enabled profile.
pub const PROMPT_OVERRIDE_SUFFIX: &str = " [y/n] ";
/// Shown when the operator answers anything other than y or n.
pub const PROMPT_INVALID_ANSWER: &str = "Please answer y or n.";

// === Messages: CLI Output ===

pub const CLI_MSG_ERROR: &str = "Error: ";
pub const CLI_MSG_NO_PROFILES: &str = "No profiles found in ";
pub const CLI_MSG_NONE_ENABLED: &str = "No profile is enabled.";
pub const CLI_MSG_ENABLED: &str = "Enabled: ";
pub const CLI_MSG_STATUS_ACTIVE: &str = "active";
pub const CLI_MSG_STATUS_INACTIVE: &str = "inactive";
pub const CLI_MSG_RESOLVER_RESTARTED: &str = "Restarted ";
pub const CLI_MSG_RESOLVER_SKIPPED: &str = "Skipped restart of ";
pub const CLI_MSG_RESOLVER_SKIPPED_SUFFIX: &str = " (not enabled)";
pub const CLI_MSG_RESOLVER_FAILED: &str = "Warning: failed to restart ";
pub const CLI_MSG_PING_HEADER: &str = "\nRanking (highest latency first):";
pub const CLI_MSG_PING_UNREACHABLE: &str = "unreachable";
pub const CLI_MSG_SYNC_START: &str = "Fetching profiles...";
pub const CLI_MSG_SYNC_INSTALLED: &str = "Installed profiles: ";
pub const CLI_MSG_SYNC_BACKUP: &str = "   Previous profiles moved to: ";
