//! Replaces the profile set with a fresh one fetched by an external tool.
//!
//! The tool writes into a staging directory next to the profiles. Nothing in
//! the profile directory changes unless the tool succeeds and produced at
//! least one profile; the previous set is then moved into a timestamped
//! backup directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use crate::constants;
use crate::error::{Error, Result};
use crate::utils;
use crate::vpn::{profile_file_name, profile_name_from_file, ProfileStore};
use crate::{log_debug, log_info, log_warning};

/// External profile fetcher. Invoked as `<command> [args...] <staging-dir>`.
#[derive(Debug, Clone)]
pub struct SyncTool {
    pub command: String,
    pub args: Vec<String>,
}

/// What a successful sync changed.
#[derive(Debug, Default)]
pub struct SyncSummary {
    /// Installed profile names, sorted.
    pub installed: Vec<String>,
    /// Where the previous profiles went; `None` if there were none.
    pub backup_dir: Option<PathBuf>,
    /// Tool log files, at their new location.
    pub log_files: Vec<PathBuf>,
}

/// Removes the staging directory however the sync ends.
struct Staging(PathBuf);

impl Staging {
    fn create(path: PathBuf) -> Result<Self> {
        if path.exists() {
            fs::remove_dir_all(&path)?;
        }
        fs::create_dir_all(&path)?;
        Ok(Self(path))
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.0) {
            log_warning!("SYNC", "Failed to remove {}: {e}", self.0.display());
        }
    }
}

/// Fetch profiles with `tool` and install them into `store`.
///
/// # Errors
///
/// `StoreUnavailable` if the profile directory cannot be read, `SyncFailed`
/// if the tool cannot run, exits non-zero or fetches no profiles, `Io` if
/// moving files fails part way.
pub fn sync_profiles(
    store: &ProfileStore,
    tool: &SyncTool,
    logs_dir: &Path,
) -> Result<SyncSummary> {
    let previous = store.list()?;
    let staging = Staging::create(store.dir().join(constants::SYNC_STAGING_DIR_NAME))?;

    run_tool(tool, &staging.0)?;

    let fetched = fetched_profiles(&staging.0)?;
    if fetched.is_empty() {
        return Err(Error::SyncFailed(format!("{} produced no profiles", tool.command)));
    }
    log_info!("SYNC", "Fetched {} profile(s)", fetched.len());

    let mut summary = SyncSummary::default();

    if !previous.is_empty() {
        let stamp = utils::backup_stamp(SystemTime::now());
        let backup = utils::get_unique_dir(store.dir(), &stamp);
        fs::create_dir(&backup)?;
        for name in &previous {
            utils::move_file(&store.path_for(name), &backup.join(profile_file_name(name)))?;
        }
        log_info!(
            "SYNC",
            "Moved {} old profile(s) to {}",
            previous.len(),
            backup.display()
        );
        summary.backup_dir = Some(backup);
    }

    for (name, path) in fetched {
        let dest = store.path_for(&name);
        utils::move_file(&path, &dest)?;
        restrict_permissions(&dest)?;
        log_debug!("SYNC", "Installed {}", dest.display());
        summary.installed.push(name);
    }

    summary.log_files = collect_logs(&staging.0, logs_dir)?;
    Ok(summary)
}

fn run_tool(tool: &SyncTool, staging: &Path) -> Result<()> {
    log_info!("SYNC", "Running {} {}", tool.command, tool.args.join(" "));

    let output = Command::new(&tool.command)
        .args(&tool.args)
        .arg(staging)
        .output()
        .map_err(|e| Error::SyncFailed(format!("failed to run {}: {e}", tool.command)))?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = if stderr.trim().is_empty() {
        format!("{} exited with {}", tool.command, output.status)
    } else {
        stderr.trim().to_string()
    };
    log_debug!("SYNC", "{} failed: {message}", tool.command);
    Err(Error::SyncFailed(message))
}

/// Profile files the tool left in `staging`, sorted by name.
fn fetched_profiles(staging: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut fetched: Vec<(String, PathBuf)> = fs::read_dir(staging)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = profile_name_from_file(path.file_name()?.to_str()?)?.to_string();
            Some((name, path))
        })
        .collect();
    fetched.sort();
    Ok(fetched)
}

fn collect_logs(staging: &Path, logs_dir: &Path) -> Result<Vec<PathBuf>> {
    let logs: Vec<PathBuf> = fs::read_dir(staging)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "log"))
        .collect();
    if logs.is_empty() {
        return Ok(Vec::new());
    }

    utils::create_user_dir(logs_dir)?;
    let mut moved = Vec::with_capacity(logs.len());
    for log in logs {
        let Some(file_name) = log.file_name() else {
            continue;
        };
        let dest = logs_dir.join(file_name);
        utils::move_file(&log, &dest)?;
        moved.push(dest);
    }
    moved.sort();
    Ok(moved)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vpn::tests::write_profile;

    fn shell_tool(script: &str) -> SyncTool {
        // `sh -c SCRIPT sh <staging>` exposes the staging dir as $1.
        SyncTool {
            command: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        }
    }

    const FETCH_TWO: &str = r#"
        printf '[Peer]\nEndpoint = 1.2.3.4:51820\n' > "$1/us1-wireguard.conf"
        printf '[Peer]\nEndpoint = 5.6.7.8:51820\n' > "$1/se1-wireguard.conf"
        echo fetched > "$1/fetch.log"
        echo ignored > "$1/README"
    "#;

    #[test]
    fn test_sync_installs_and_backs_up() {
        let profiles = tempfile::tempdir().unwrap();
        let config = tempfile::tempdir().unwrap();
        write_profile(profiles.path(), "old1", Some("9.9.9.9:51820"));
        let store = ProfileStore::new(profiles.path());
        let logs_dir = config.path().join("logs");

        let summary = sync_profiles(&store, &shell_tool(FETCH_TWO), &logs_dir).unwrap();

        assert_eq!(summary.installed, vec!["se1", "us1"]);
        assert_eq!(store.list().unwrap(), vec!["se1", "us1"]);
        assert_eq!(store.endpoint_host("us1").unwrap(), "1.2.3.4");

        let backup = summary.backup_dir.unwrap();
        assert!(backup.join("old1-wireguard.conf").is_file());
        assert!(!store.exists("old1"));

        assert_eq!(summary.log_files, vec![logs_dir.join("fetch.log")]);
        assert!(logs_dir.join("fetch.log").is_file());
        assert!(!profiles.path().join(constants::SYNC_STAGING_DIR_NAME).exists());
        assert!(!profiles.path().join("README").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let profiles = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(profiles.path());
        let logs_dir = profiles.path().join("logs");

        let summary = sync_profiles(&store, &shell_tool(FETCH_TWO), &logs_dir).unwrap();

        assert!(summary.backup_dir.is_none());
        let mode = fs::metadata(store.path_for("us1")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_tool_failure_changes_nothing() {
        let profiles = tempfile::tempdir().unwrap();
        write_profile(profiles.path(), "old1", Some("9.9.9.9"));
        let store = ProfileStore::new(profiles.path());
        let tool = shell_tool(
            r#"touch "$1/us1-wireguard.conf"; echo 'account expired' >&2; exit 3"#,
        );

        let err = sync_profiles(&store, &tool, &profiles.path().join("logs")).unwrap_err();

        assert!(matches!(err, Error::SyncFailed(msg) if msg == "account expired"));
        assert_eq!(store.list().unwrap(), vec!["old1"]);
        assert!(!profiles.path().join(constants::SYNC_STAGING_DIR_NAME).exists());
    }

    #[test]
    fn test_empty_fetch_fails() {
        let profiles = tempfile::tempdir().unwrap();
        write_profile(profiles.path(), "old1", Some("9.9.9.9"));
        let store = ProfileStore::new(profiles.path());

        let logs_dir = profiles.path().join("logs");
        let err = sync_profiles(&store, &shell_tool("true"), &logs_dir).unwrap_err();

        assert!(matches!(err, Error::SyncFailed(_)));
        assert_eq!(store.list().unwrap(), vec!["old1"]);
    }

    #[test]
    fn test_missing_tool_fails() {
        let profiles = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(profiles.path());
        let tool = SyncTool {
            command: "/nonexistent/wg-fetch".to_string(),
            args: Vec::new(),
        };

        let err = sync_profiles(&store, &tool, &profiles.path().join("logs")).unwrap_err();
        assert!(matches!(err, Error::SyncFailed(msg) if msg.contains("failed to run")));
    }

    #[test]
    fn test_missing_profile_dir() {
        let store = ProfileStore::new("/nonexistent/wgswitch-profiles");
        let err = sync_profiles(&store, &shell_tool("true"), Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable { .. }));
    }
}
