//! Derives the enabled/active profile from the supervisor.
//!
//! Nothing is cached: the supervisor's registration table can change between
//! commands (manual `systemctl` use), so every call re-queries it.

use crate::error::Result;
use crate::platform::{profile_from_unit, unit_for, ServiceSupervisor};
use crate::state::ActiveProfile;

pub struct ActiveProfileTracker<'a, S: ServiceSupervisor + ?Sized> {
    supervisor: &'a S,
}

impl<'a, S: ServiceSupervisor + ?Sized> ActiveProfileTracker<'a, S> {
    pub fn new(supervisor: &'a S) -> Self {
        Self { supervisor }
    }

    /// Name of the enabled profile, if any.
    ///
    /// # Errors
    ///
    /// Propagates supervisor query failures.
    pub fn current(&self) -> Result<Option<String>> {
        Ok(self
            .supervisor
            .currently_enabled_unit()?
            .as_deref()
            .and_then(profile_from_unit)
            .map(str::to_string))
    }

    /// Whether the enabled profile is running. `false` when none is enabled.
    ///
    /// # Errors
    ///
    /// Propagates supervisor query failures.
    pub fn is_active(&self) -> Result<bool> {
        match self.current()? {
            Some(profile) => self.supervisor.is_active(&unit_for(&profile)),
            None => Ok(false),
        }
    }

    /// Enabled profile together with its running state.
    ///
    /// # Errors
    ///
    /// Propagates supervisor query failures.
    pub fn snapshot(&self) -> Result<Option<ActiveProfile>> {
        let Some(name) = self.current()? else {
            return Ok(None);
        };
        let active = self.supervisor.is_active(&unit_for(&name))?;
        Ok(Some(ActiveProfile { name, active }))
    }
}
