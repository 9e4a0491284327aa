//! Read-only reporting over the profile store: listing, country codes and
//! latency ranking.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::platform::LatencyProbe;
use crate::vpn::ProfileStore;
use crate::{log_debug, log_warning};

/// One probe result, reported as soon as it completes.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub profile: String,
    /// Endpoint host, absent when the profile had none.
    pub host: Option<String>,
    pub latency_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedProfile {
    pub profile: String,
    pub latency_ms: f64,
}

pub struct DiagnosticsReporter<'a, P: LatencyProbe + ?Sized> {
    store: &'a ProfileStore,
    probe: &'a P,
}

impl<'a, P: LatencyProbe + ?Sized> DiagnosticsReporter<'a, P> {
    pub fn new(store: &'a ProfileStore, probe: &'a P) -> Self {
        Self { store, probe }
    }

    /// # Errors
    ///
    /// `StoreUnavailable` if the profile directory cannot be read.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// # Errors
    ///
    /// `StoreUnavailable` if the profile directory cannot be read.
    pub fn country_codes(&self) -> Result<BTreeSet<String>> {
        self.store.country_codes()
    }

    /// Probe every profile starting with `code`, one after another.
    ///
    /// `on_measurement` sees each raw result in store order. The returned
    /// ranking is sorted by descending latency and leaves out unreachable
    /// profiles; equal latencies keep store order.
    ///
    /// # Errors
    ///
    /// `MissingArgument` for a blank code, `NoMatchingProfiles` when nothing
    /// matches, `StoreUnavailable` if the directory cannot be read.
    pub fn latency_ranking(
        &self,
        code: &str,
        mut on_measurement: impl FnMut(&Measurement),
    ) -> Result<Vec<RankedProfile>> {
        let code = code.trim();
        if code.is_empty() {
            return Err(Error::MissingArgument("country code"));
        }

        let profiles = self.store.profiles_with_prefix(code)?;
        if profiles.is_empty() {
            return Err(Error::NoMatchingProfiles(code.to_string()));
        }
        log_debug!("DIAG", "Probing {} profile(s) for '{code}'", profiles.len());

        let mut ranked = Vec::with_capacity(profiles.len());
        for profile in profiles {
            let measurement = self.measure(profile);
            on_measurement(&measurement);
            if let Some(latency_ms) = measurement.latency_ms {
                ranked.push(RankedProfile {
                    profile: measurement.profile,
                    latency_ms,
                });
            }
        }

        // Stable sort: ties stay in store order.
        ranked.sort_by(|a, b| b.latency_ms.total_cmp(&a.latency_ms));
        Ok(ranked)
    }

    fn measure(&self, profile: String) -> Measurement {
        match self.store.endpoint_host(&profile) {
            Ok(host) => {
                let latency_ms = self.probe.measure(&host);
                log_debug!("DIAG", "{profile} ({host}): {latency_ms:?}");
                Measurement {
                    profile,
                    host: Some(host),
                    latency_ms,
                }
            }
            Err(e) => {
                log_warning!("DIAG", "Skipping latency probe: {e}");
                Measurement {
                    profile,
                    host: None,
                    latency_ms: None,
                }
            }
        }
    }
}
