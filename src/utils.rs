//! Utility functions for time formatting, privileges and path management.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Check if the current process is running as root (UID 0)
///
/// Uses the effective user ID from the OS instead of spawning an external command.
#[must_use]
#[cfg(unix)]
#[allow(unsafe_code)]
pub fn is_root() -> bool {
    // SAFETY: geteuid() is a simple syscall that returns the effective user ID.
    // It has no side effects and always succeeds.
    unsafe { libc::geteuid() == 0 }
}

#[must_use]
#[cfg(not(unix))]
pub fn is_root() -> bool {
    false
}

/// Create a directory (and parents) owned by the real user.
///
/// Under sudo, `create_dir_all` produces root-owned dirs.
/// This wraps that call and hands ownership to the invoking user.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn create_user_dir(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)?;
    crate::config::fix_ownership(path);
    Ok(())
}

/// Broken-down local time, as produced by `localtime_r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl LocalTime {
    /// Renders `HH:MM:SS`.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }

    /// Renders `YYYY-MM-DD_HH-MM`, the profile backup directory name.
    pub fn backup_stamp(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}_{:02}-{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Converts any `SystemTime` into a local `HH:MM:SS` string.
#[must_use]
pub fn format_system_time_local(time: SystemTime) -> String {
    local_time(time).map_or_else(|| "00:00:00".to_string(), |t| t.clock())
}

/// Timestamp used to name a profile backup directory for `time`.
#[must_use]
pub fn backup_stamp(time: SystemTime) -> String {
    local_time(time).map_or_else(|| "1970-01-01_00-00".to_string(), |t| t.backup_stamp())
}

/// Breaks `time` down in the local time zone.
#[cfg(unix)]
#[allow(unsafe_code, clippy::cast_sign_loss)]
pub fn local_time(time: SystemTime) -> Option<LocalTime> {
    let secs = time
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()?
        .as_secs();

    // SAFETY: localtime_r writes into our stack-allocated `tm` and is
    // thread-safe (unlike localtime). We pass a valid pointer to both args.
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    // time_t is i64 on most platforms; u64→i64 is safe until year 2262
    #[allow(clippy::cast_possible_wrap)]
    let time_t = secs as libc::time_t;
    let result = unsafe { libc::localtime_r(&time_t, &mut tm) };
    if result.is_null() {
        return None;
    }

    Some(LocalTime {
        year: tm.tm_year + 1900,
        month: (tm.tm_mon + 1) as u32,
        day: tm.tm_mday as u32,
        hour: tm.tm_hour as u32,
        minute: tm.tm_min as u32,
        second: tm.tm_sec as u32,
    })
}

#[cfg(not(unix))]
pub fn local_time(_time: SystemTime) -> Option<LocalTime> {
    None
}

/// Returns a directory path under `parent` named `name` that does not exist yet,
/// appending `_1`, `_2`... on collision.
pub fn get_unique_dir(parent: &Path, name: &str) -> PathBuf {
    let mut path = parent.join(name);
    let mut counter = 1;
    while path.exists() {
        path = parent.join(format!("{name}_{counter}"));
        counter += 1;
    }
    path
}

/// Moves a file, falling back to copy + remove across filesystems.
///
/// # Errors
///
/// Returns an error if neither rename nor copy succeeds.
pub fn move_file(src: &Path, dst: &Path) -> std::io::Result<()> {
    if std::fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    std::fs::copy(src, dst)?;
    std::fs::remove_file(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_backup_stamp_shape() {
        let stamp = backup_stamp(SystemTime::now());
        // YYYY-MM-DD_HH-MM
        assert_eq!(stamp.len(), 16);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[7..8], "-");
        assert_eq!(&stamp[10..11], "_");
        assert_eq!(&stamp[13..14], "-");
        assert!(stamp
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == '_'));
    }

    #[test]
    fn test_local_time_renders() {
        let t = LocalTime {
            year: 2024,
            month: 3,
            day: 7,
            hour: 9,
            minute: 5,
            second: 1,
        };
        assert_eq!(t.clock(), "09:05:01");
        assert_eq!(t.backup_stamp(), "2024-03-07_09-05");
    }

    #[test]
    fn test_format_system_time_local_shape() {
        let s = format_system_time_local(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400));
        assert_eq!(s.len(), 8);
        assert_eq!(s.matches(':').count(), 2);
    }

    #[test]
    fn test_get_unique_dir_with_collision() {
        let dir = tempfile::tempdir().unwrap();
        let first = get_unique_dir(dir.path(), "2024-01-01_10-00");
        assert_eq!(first, dir.path().join("2024-01-01_10-00"));

        std::fs::create_dir(&first).unwrap();
        let second = get_unique_dir(dir.path(), "2024-01-01_10-00");
        assert_eq!(second, dir.path().join("2024-01-01_10-00_1"));

        std::fs::create_dir(&second).unwrap();
        let third = get_unique_dir(dir.path(), "2024-01-01_10-00");
        assert_eq!(third, dir.path().join("2024-01-01_10-00_2"));
    }

    #[test]
    fn test_move_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.conf");
        let dst = dir.path().join("b.conf");
        std::fs::write(&src, "x").unwrap();

        move_file(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "x");
    }
}
