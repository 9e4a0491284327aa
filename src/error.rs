//! Error taxonomy shared by the store, supervisor, lifecycle and sync modules.

use std::io;
use std::path::PathBuf;

/// Result type for profile and lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a wgswitch operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `<name>-wireguard.conf` exists for the requested profile
    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    /// The profile exists but carries no usable `Endpoint` line
    #[error("profile '{name}' is malformed: {reason}")]
    MalformedProfile { name: String, reason: String },

    /// The profile directory is missing or unreadable
    #[error("profile directory {} is unavailable: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no profile is enabled")]
    NoProfileEnabled,

    #[error("profile '{0}' is already enabled")]
    AlreadyEnabled(String),

    #[error("profile '{0}' is already active")]
    AlreadyActive(String),

    #[error("profile '{0}' is not active")]
    NotActive(String),

    /// A required command argument was empty or absent
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("no profiles match country code '{0}'")]
    NoMatchingProfiles(String),

    #[error("no profile is enabled and none was specified")]
    NoProfileSpecified,

    /// The supervisor rejected a request; `message` is its own diagnostic text
    #[error("systemctl {action} {unit} failed: {message}")]
    SupervisorError {
        action: &'static str,
        unit: String,
        message: String,
    },

    /// The operator answered "n" or input ended before an answer
    #[error("operation cancelled")]
    ConfirmationDeclined,

    /// The profile synchronization tool failed; nothing was changed
    #[error("profile sync failed: {0}")]
    SyncFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
