//! In-memory supervisor and probe used by the lifecycle and diagnostics tests.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::constants;
use crate::error::{Error, Result};
use crate::platform::{select_profile_unit, unit_for, LatencyProbe, ServiceSupervisor};

/// Models systemd's enabled/active sets and records every state-changing call.
#[derive(Default)]
pub struct FakeSupervisor {
    enabled: RefCell<BTreeSet<String>>,
    active: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<(&'static str, String)>>,
    failures: RefCell<HashMap<(&'static str, String), String>>,
}

impl FakeSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `profile` enabled, and active when `active` is set.
    pub fn with_profile(self, profile: &str, active: bool) -> Self {
        let unit = unit_for(profile);
        self.enabled.borrow_mut().insert(unit.clone());
        if active {
            self.active.borrow_mut().insert(unit);
        }
        self
    }

    /// Register an arbitrary unit (e.g. the resolver) for auto-start.
    pub fn with_enabled_unit(self, unit: &str) -> Self {
        self.enabled.borrow_mut().insert(unit.to_string());
        self
    }

    /// Make `action` on `unit` fail with `message`.
    pub fn fail_on(self, action: &'static str, unit: &str, message: &str) -> Self {
        self.failures
            .borrow_mut()
            .insert((action, unit.to_string()), message.to_string());
        self
    }

    /// Calls rendered as `"action unit"` for compact assertions.
    pub fn call_log(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(action, unit)| format!("{action} {unit}"))
            .collect()
    }

    pub fn enabled_wg_units(&self) -> Vec<String> {
        self.enabled
            .borrow()
            .iter()
            .filter(|u| u.starts_with(constants::AUTOSTART_UNIT_PATTERN))
            .cloned()
            .collect()
    }

    pub fn unit_active(&self, unit: &str) -> bool {
        self.active.borrow().contains(unit)
    }

    fn record(&self, action: &'static str, unit: &str) -> Result<()> {
        self.calls.borrow_mut().push((action, unit.to_string()));
        if let Some(message) = self.failures.borrow().get(&(action, unit.to_string())) {
            return Err(Error::SupervisorError {
                action,
                unit: unit.to_string(),
                message: message.clone(),
            });
        }
        Ok(())
    }
}

impl ServiceSupervisor for FakeSupervisor {
    fn enable(&self, unit: &str) -> Result<()> {
        self.record("enable", unit)?;
        self.enabled.borrow_mut().insert(unit.to_string());
        Ok(())
    }

    fn disable(&self, unit: &str) -> Result<()> {
        self.record("disable", unit)?;
        self.enabled.borrow_mut().remove(unit);
        Ok(())
    }

    fn start(&self, unit: &str) -> Result<()> {
        self.record("start", unit)?;
        self.active.borrow_mut().insert(unit.to_string());
        Ok(())
    }

    fn stop(&self, unit: &str) -> Result<()> {
        self.record("stop", unit)?;
        self.active.borrow_mut().remove(unit);
        Ok(())
    }

    fn restart(&self, unit: &str) -> Result<()> {
        self.record("restart", unit)?;
        self.active.borrow_mut().insert(unit.to_string());
        Ok(())
    }

    fn is_enabled(&self, unit: &str) -> Result<bool> {
        Ok(self.enabled.borrow().contains(unit))
    }

    fn is_active(&self, unit: &str) -> Result<bool> {
        Ok(self.active.borrow().contains(unit))
    }

    fn currently_enabled_unit(&self) -> Result<Option<String>> {
        Ok(select_profile_unit(&self.enabled_wg_units()))
    }
}

/// Returns scripted latencies per host and records the probe order.
#[derive(Default)]
pub struct FakeProbe {
    latencies: HashMap<String, Option<f64>>,
    probed: RefCell<Vec<String>>,
}

impl FakeProbe {
    pub fn new(latencies: &[(&str, Option<f64>)]) -> Self {
        Self {
            latencies: latencies
                .iter()
                .map(|(host, ms)| ((*host).to_string(), *ms))
                .collect(),
            probed: RefCell::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<String> {
        self.probed.borrow().clone()
    }
}

impl LatencyProbe for FakeProbe {
    fn measure(&self, host: &str) -> Option<f64> {
        self.probed.borrow_mut().push(host.to_string());
        self.latencies.get(host).copied().flatten()
    }
}
