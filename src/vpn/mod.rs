//! WireGuard profile store.
//!
//! Profiles live in one flat directory as `<name>-wireguard.conf`. The store
//! only enumerates and reads them; creating and replacing them is the job of
//! [`sync`].

pub mod sync;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{Error, Result};
use crate::{log_debug, log_warning};

/// Read-only view over the profile directory
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the definition file for `name`, whether or not it exists.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(profile_file_name(name))
    }

    /// All profile names, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreUnavailable`] if the directory is missing or unreadable.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| Error::StoreUnavailable {
            path: self.dir.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let file_name = entry.file_name();
                profile_name_from_file(file_name.to_str()?).map(str::to_string)
            })
            .collect();
        names.sort();

        log_debug!("STORE", "Found {} profile(s) in {}", names.len(), self.dir.display());
        Ok(names)
    }

    pub fn exists(&self, name: &str) -> bool {
        is_valid_name(name) && self.path_for(name).is_file()
    }

    /// Country codes derived from every profile name, deduplicated.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileStore::list`] failures.
    pub fn country_codes(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .list()?
            .iter()
            .filter_map(|name| country_code(name))
            .collect())
    }

    /// Profiles whose name starts with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Propagates [`ProfileStore::list`] failures.
    pub fn profiles_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect())
    }

    /// Host part of the profile's `Endpoint = host:port` line.
    ///
    /// # Errors
    ///
    /// [`Error::ProfileNotFound`] if the profile is absent,
    /// [`Error::MalformedProfile`] if it has no usable endpoint.
    pub fn endpoint_host(&self, name: &str) -> Result<String> {
        if !self.exists(name) {
            return Err(Error::ProfileNotFound(name.to_string()));
        }

        let content = fs::read_to_string(self.path_for(name)).map_err(|e| {
            log_warning!("STORE", "Failed to read profile '{name}': {e}");
            Error::MalformedProfile {
                name: name.to_string(),
                reason: format!("unreadable: {e}"),
            }
        })?;

        parse_endpoint_host(&content).ok_or_else(|| Error::MalformedProfile {
            name: name.to_string(),
            reason: "no Endpoint found".to_string(),
        })
    }
}

/// `<name>-wireguard.conf`
pub fn profile_file_name(name: &str) -> String {
    format!("{name}{}", constants::PROFILE_FILE_SUFFIX)
}

/// Inverse of [`profile_file_name`]; `None` for files outside the convention.
pub fn profile_name_from_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(constants::PROFILE_FILE_SUFFIX)
        .filter(|name| is_valid_name(name))
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".."
}

/// Country code of a profile: the leading ASCII letters of its name, lower-cased.
///
/// `us1` -> `us`, `ch-zrh-3` -> `ch`. Names that do not start with a letter have none.
pub fn country_code(name: &str) -> Option<String> {
    let code: String = name
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect();
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_lowercase())
    }
}

/// Extract the endpoint host from a WireGuard config.
///
/// Handles `host:port`, bare `host`, and bracketed IPv6 `[addr]:port`.
pub fn parse_endpoint_host(content: &str) -> Option<String> {
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("endpoint") {
            continue;
        }

        let value = value.trim();
        let host = if let Some(rest) = value.strip_prefix('[') {
            rest.split(']').next().unwrap_or("")
        } else if value.matches(':').count() == 1 {
            value.split(':').next().unwrap_or("")
        } else {
            value
        };

        let host = host.trim();
        if !host.is_empty() {
            return Some(host.to_string());
        }
    }
    None
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn write_profile(dir: &Path, name: &str, endpoint: Option<&str>) {
        let mut content = String::from(concat!(
            "[Interface]\nPrivateKey = aGVsbG8=\nAddress = 10.64.0.2/32\n\n",
            "[Peer]\nPublicKey = d29ybGQ=\n",
        ));
        if let Some(ep) = endpoint {
            content.push_str(&format!("Endpoint = {ep}\n"));
        }
        content.push_str("AllowedIPs = 0.0.0.0/0\n");
        fs::write(dir.join(profile_file_name(name)), content).unwrap();
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "us2", Some("2.2.2.2:51820"));
        write_profile(dir.path(), "ca1", Some("3.3.3.3:51820"));
        write_profile(dir.path(), "us1", Some("1.1.1.1:51820"));
        fs::write(dir.path().join("wg0.conf"), "[Interface]\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        fs::create_dir(dir.path().join("2024-01-01_10-00")).unwrap();

        let store = ProfileStore::new(dir.path());
        assert_eq!(store.list().unwrap(), vec!["ca1", "us1", "us2"]);
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("absent"));
        assert!(matches!(store.list(), Err(Error::StoreUnavailable { .. })));
    }

    #[test]
    fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "us1", Some("1.1.1.1:51820"));
        let store = ProfileStore::new(dir.path());

        assert!(store.exists("us1"));
        assert!(!store.exists("us2"));
        assert!(!store.exists(""));
        assert!(!store.exists("../us1"));
    }

    #[test]
    fn test_country_codes_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["us1", "us2", "ca1"] {
            write_profile(dir.path(), name, Some("1.1.1.1:51820"));
        }
        let store = ProfileStore::new(dir.path());

        let codes: Vec<String> = store.country_codes().unwrap().into_iter().collect();
        assert_eq!(codes, vec!["ca", "us"]);
    }

    #[test]
    fn test_country_code_variants() {
        assert_eq!(country_code("us1").as_deref(), Some("us"));
        assert_eq!(country_code("ch-zrh-3").as_deref(), Some("ch"));
        assert_eq!(country_code("GB12").as_deref(), Some("gb"));
        assert_eq!(country_code("se"), Some("se".to_string()));
        assert_eq!(country_code("42"), None);
    }

    #[test]
    fn test_profiles_with_prefix() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["us1", "us2", "ca1"] {
            write_profile(dir.path(), name, Some("1.1.1.1:51820"));
        }
        let store = ProfileStore::new(dir.path());

        assert_eq!(store.profiles_with_prefix("us").unwrap(), vec!["us1", "us2"]);
        assert!(store.profiles_with_prefix("de").unwrap().is_empty());
    }

    #[test]
    fn test_endpoint_host() {
        let dir = tempfile::tempdir().unwrap();
        write_profile(dir.path(), "us1", Some("us1.relay.example:51820"));
        write_profile(dir.path(), "us2", None);
        let store = ProfileStore::new(dir.path());

        assert_eq!(store.endpoint_host("us1").unwrap(), "us1.relay.example");
        assert!(matches!(
            store.endpoint_host("us2"),
            Err(Error::MalformedProfile { .. })
        ));
        assert!(matches!(
            store.endpoint_host("us3"),
            Err(Error::ProfileNotFound(name)) if name == "us3"
        ));
    }

    #[test]
    fn test_parse_endpoint_host_forms() {
        assert_eq!(
            parse_endpoint_host("Endpoint = 185.65.134.1:51820").as_deref(),
            Some("185.65.134.1")
        );
        assert_eq!(
            parse_endpoint_host("endpoint=[2a03:1b20::1]:51820").as_deref(),
            Some("2a03:1b20::1")
        );
        assert_eq!(
            parse_endpoint_host("Endpoint = relay.example").as_deref(),
            Some("relay.example")
        );
        assert_eq!(parse_endpoint_host("# Endpoint = 1.2.3.4:1\n"), None);
        assert_eq!(parse_endpoint_host("Endpoint = \n"), None);
        assert_eq!(parse_endpoint_host("PublicKey = abc=\n"), None);
    }

    #[test]
    fn test_profile_name_from_file() {
        assert_eq!(profile_name_from_file("us1-wireguard.conf"), Some("us1"));
        assert_eq!(profile_name_from_file("-wireguard.conf"), None);
        assert_eq!(profile_name_from_file("us1.conf"), None);
    }
}
