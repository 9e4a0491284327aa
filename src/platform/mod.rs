//! Platform abstraction layer for the external collaborators.
//!
//! The lifecycle code talks to the service supervisor and the latency tool
//! only through the traits defined here. Linux implementations live in
//! [`linux`]; tests substitute the fakes in `fake`.
//!
//! - Supervisor: systemd via `systemctl` and the `multi-user.target.wants` directory
//! - Latency: `ping`

pub mod linux;

#[cfg(test)]
pub mod fake;

use crate::constants;
use crate::error::Result;
use crate::log_warning;

/// Service supervisor primitives keyed by unit name.
///
/// Every request is issued once; retry policy belongs to the caller and the
/// lifecycle applies none.
pub trait ServiceSupervisor {
    /// Register the unit for auto-start.
    fn enable(&self, unit: &str) -> Result<()>;

    /// Remove the unit's auto-start registration.
    fn disable(&self, unit: &str) -> Result<()>;

    fn start(&self, unit: &str) -> Result<()>;

    fn stop(&self, unit: &str) -> Result<()>;

    fn restart(&self, unit: &str) -> Result<()>;

    fn is_enabled(&self, unit: &str) -> Result<bool>;

    fn is_active(&self, unit: &str) -> Result<bool>;

    /// The single `wg-quick` unit registered for auto-start, if any.
    fn currently_enabled_unit(&self) -> Result<Option<String>>;
}

/// Latency measurement against one host.
pub trait LatencyProbe {
    /// Round-trip latency in milliseconds, or `None` when unreachable.
    fn measure(&self, host: &str) -> Option<f64>;
}

/// Unit name for a profile: `wg-quick@<name>-wireguard.service`.
pub fn unit_for(profile: &str) -> String {
    format!(
        "{}{profile}{}",
        constants::UNIT_PREFIX,
        constants::UNIT_SUFFIX
    )
}

/// Profile name for a unit, or `None` if the unit is outside the naming convention.
pub fn profile_from_unit(unit: &str) -> Option<&str> {
    unit.strip_prefix(constants::UNIT_PREFIX)?
        .strip_suffix(constants::UNIT_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// The enabled profile unit among the enabled `wg-quick*` units.
///
/// Units outside the profile naming convention are logged and skipped, so
/// they never hide a profile unit. With several profile units the first wins.
pub fn select_profile_unit(units: &[String]) -> Option<String> {
    let (profiles, foreign): (Vec<&String>, Vec<&String>) = units
        .iter()
        .partition(|unit| profile_from_unit(unit).is_some());

    for unit in foreign {
        log_warning!(
            "SUPERVISOR",
            "Ignoring enabled unit outside the profile naming convention: {unit}"
        );
    }
    if profiles.len() > 1 {
        let names: Vec<&str> = profiles.iter().map(|unit| unit.as_str()).collect();
        log_warning!(
            "SUPERVISOR",
            "More than one profile unit is enabled ({}); using {}",
            names.join(", "),
            names[0]
        );
    }
    profiles.first().map(|unit| (*unit).clone())
}
