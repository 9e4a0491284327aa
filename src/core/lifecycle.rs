//! Profile lifecycle state machine.
//!
//! Per profile: `Unregistered -> Enabled(Inactive) -> Enabled(Active)`, with at
//! most one profile enabled host-wide. Each operation re-reads the enabled
//! profile through [`ActiveProfileTracker`], checks its preconditions, then
//! applies an ordered list of [`Step`]s to the supervisor. The first failing
//! step aborts the rest and nothing is rolled back: a failure after a disable
//! leaves no profile enabled.
//!
//! Transitions that change the running profile end with a best-effort restart
//! of the name-resolution service. The disable that precedes an override or a
//! switch defers it, so a switch restarts the resolver exactly once.

use crate::core::prompt::Confirm;
use crate::core::tracker::ActiveProfileTracker;
use crate::error::{Error, Result};
use crate::platform::{unit_for, ServiceSupervisor};
use crate::state::{ResolverRestart, Step, TransitionReport};
use crate::vpn::ProfileStore;
use crate::{log_info, log_warning};

/// Whether a transition ends with the dependent resolver restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Resolver {
    Restart,
    Defer,
}

pub struct LifecycleController<'a, S: ServiceSupervisor + ?Sized> {
    store: &'a ProfileStore,
    supervisor: &'a S,
    resolver_unit: &'a str,
}

impl<'a, S: ServiceSupervisor + ?Sized> LifecycleController<'a, S> {
    pub fn new(store: &'a ProfileStore, supervisor: &'a S, resolver_unit: &'a str) -> Self {
        Self {
            store,
            supervisor,
            resolver_unit,
        }
    }

    pub fn tracker(&self) -> ActiveProfileTracker<'a, S> {
        ActiveProfileTracker::new(self.supervisor)
    }

    /// Register `name` for auto-start without starting it.
    ///
    /// If another profile is enabled the operator must confirm; it is then
    /// fully disabled (and stopped if running) before `name` is enabled.
    ///
    /// # Errors
    ///
    /// `ProfileNotFound`, `AlreadyEnabled`, `ConfirmationDeclined`, or the
    /// failing step's `SupervisorError`.
    pub fn enable(&self, name: &str, confirm: &mut dyn Confirm) -> Result<TransitionReport> {
        let name = required(name)?;
        self.ensure_exists(name)?;

        let mut report = TransitionReport::default();
        let tracker = self.tracker();
        if let Some(current) = tracker.current()? {
            if current == name {
                return Err(Error::AlreadyEnabled(current));
            }

            let question =
                format!("Profile '{current}' is enabled. Disable it and enable '{name}' instead?");
            if !confirm.confirm(&question)? {
                log_info!("LIFECYCLE", "Override of '{current}' declined");
                return Err(Error::ConfirmationDeclined);
            }
            self.disable_profile(&current, Resolver::Defer, &mut report)?;
        }

        self.apply(vec![Step::Enable(name.to_string())], &mut report)?;
        Ok(report)
    }

    /// Start the enabled profile, or enable and start `name` when none is enabled.
    ///
    /// # Errors
    ///
    /// `AlreadyActive`, `NoProfileSpecified`, `ProfileNotFound`, or a `SupervisorError`.
    pub fn start(&self, name: Option<&str>) -> Result<TransitionReport> {
        let name = optional(name);
        let tracker = self.tracker();

        let Some(current) = tracker.current()? else {
            let name = name.ok_or(Error::NoProfileSpecified)?;
            return self.enable_and_start(name);
        };

        warn_if_ignored(name, &current);
        if tracker.is_active()? {
            return Err(Error::AlreadyActive(current));
        }

        let mut report = TransitionReport::default();
        self.apply(vec![Step::Start(current)], &mut report)?;
        report.resolver = self.restart_resolver();
        Ok(report)
    }

    /// Restart the enabled profile in place, or behave as [`Self::start`] with `name`.
    ///
    /// # Errors
    ///
    /// `NoProfileSpecified`, `ProfileNotFound`, or a `SupervisorError`.
    pub fn restart(&self, name: Option<&str>) -> Result<TransitionReport> {
        let name = optional(name);

        let Some(current) = self.tracker().current()? else {
            let name = name.ok_or(Error::NoProfileSpecified)?;
            return self.enable_and_start(name);
        };

        warn_if_ignored(name, &current);
        let mut report = TransitionReport::default();
        self.apply(vec![Step::Restart(current)], &mut report)?;
        report.resolver = self.restart_resolver();
        Ok(report)
    }

    /// Replace the enabled profile with `name` and start it. Never prompts.
    ///
    /// # Errors
    ///
    /// `MissingArgument`, `AlreadyEnabled`, `ProfileNotFound`, or a `SupervisorError`.
    pub fn switch(&self, name: &str) -> Result<TransitionReport> {
        let name = required(name)?;
        let current = self.tracker().current()?;
        if current.as_deref() == Some(name) {
            return Err(Error::AlreadyEnabled(name.to_string()));
        }
        self.ensure_exists(name)?;

        let mut report = TransitionReport::default();
        if let Some(current) = current {
            self.disable_profile(&current, Resolver::Defer, &mut report)?;
        }
        self.apply(
            vec![Step::Enable(name.to_string()), Step::Start(name.to_string())],
            &mut report,
        )?;
        report.resolver = self.restart_resolver();
        Ok(report)
    }

    /// Stop the enabled, running profile. It stays enabled.
    ///
    /// # Errors
    ///
    /// `NoProfileEnabled`, `NotActive`, or a `SupervisorError`.
    pub fn stop(&self) -> Result<TransitionReport> {
        let tracker = self.tracker();
        let current = tracker.current()?.ok_or(Error::NoProfileEnabled)?;
        if !tracker.is_active()? {
            return Err(Error::NotActive(current));
        }

        let mut report = TransitionReport::default();
        self.apply(vec![Step::Stop(current)], &mut report)?;
        report.resolver = self.restart_resolver();
        Ok(report)
    }

    /// Unregister the enabled profile, stopping it afterwards if it was running.
    ///
    /// # Errors
    ///
    /// `NoProfileEnabled` or a `SupervisorError`.
    pub fn disable(&self) -> Result<TransitionReport> {
        let current = self.tracker().current()?.ok_or(Error::NoProfileEnabled)?;
        let mut report = TransitionReport::default();
        self.disable_profile(&current, Resolver::Restart, &mut report)?;
        Ok(report)
    }

    /// Combined enable + start for when no profile is enabled.
    fn enable_and_start(&self, name: &str) -> Result<TransitionReport> {
        self.ensure_exists(name)?;

        let mut report = TransitionReport::default();
        // Re-query: a registration may have appeared since the caller looked.
        if let Some(stale) = self.tracker().current()? {
            log_warning!(
                "LIFECYCLE",
                "Found stale enabled profile '{stale}'; disabling it first"
            );
            self.disable_profile(&stale, Resolver::Defer, &mut report)?;
        }

        self.apply(
            vec![Step::Enable(name.to_string()), Step::Start(name.to_string())],
            &mut report,
        )?;
        report.resolver = self.restart_resolver();
        Ok(report)
    }

    /// Disable `name`, then stop it if it was running.
    fn disable_profile(
        &self,
        name: &str,
        resolver: Resolver,
        report: &mut TransitionReport,
    ) -> Result<()> {
        let was_active = self.supervisor.is_active(&unit_for(name))?;

        let mut steps = vec![Step::Disable(name.to_string())];
        if was_active {
            steps.push(Step::Stop(name.to_string()));
        }
        self.apply(steps, report)?;

        if resolver == Resolver::Restart {
            report.resolver = self.restart_resolver();
        }
        Ok(())
    }

    /// Apply `steps` in order, stopping at the first failure.
    fn apply(&self, steps: Vec<Step>, report: &mut TransitionReport) -> Result<()> {
        for step in steps {
            let unit = unit_for(step.profile());
            let result = match &step {
                Step::Enable(_) => self.supervisor.enable(&unit),
                Step::Disable(_) => self.supervisor.disable(&unit),
                Step::Start(_) => self.supervisor.start(&unit),
                Step::Stop(_) => self.supervisor.stop(&unit),
                Step::Restart(_) => self.supervisor.restart(&unit),
            };

            if let Err(e) = result {
                if report.steps.iter().any(|s| matches!(s, Step::Disable(_))) {
                    log_warning!(
                        "LIFECYCLE",
                        "'{step}' failed after a disable; no profile is enabled now"
                    );
                }
                return Err(e);
            }

            log_info!("LIFECYCLE", "{step}");
            report.steps.push(step);
        }
        Ok(())
    }

    /// Best-effort restart of the name-resolution service.
    fn restart_resolver(&self) -> ResolverRestart {
        let unit = self.resolver_unit;
        match self.supervisor.is_enabled(unit) {
            Ok(false) => {
                log_info!("LIFECYCLE", "{unit} is not enabled; skipping restart");
                ResolverRestart::Skipped
            }
            Ok(true) => match self.supervisor.restart(unit) {
                Ok(()) => {
                    log_info!("LIFECYCLE", "Restarted {unit}");
                    ResolverRestart::Restarted
                }
                Err(e) => {
                    log_warning!("LIFECYCLE", "{e}");
                    ResolverRestart::Failed(e.to_string())
                }
            },
            Err(e) => {
                log_warning!("LIFECYCLE", "{e}");
                ResolverRestart::Failed(e.to_string())
            }
        }
    }

    fn ensure_exists(&self, name: &str) -> Result<()> {
        if self.store.exists(name) {
            Ok(())
        } else {
            Err(Error::ProfileNotFound(name.to_string()))
        }
    }
}

fn required(name: &str) -> Result<&str> {
    optional(Some(name)).ok_or(Error::MissingArgument("profile name"))
}

fn optional(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

fn warn_if_ignored(requested: Option<&str>, current: &str) {
    if let Some(requested) = requested.filter(|r| *r != current) {
        log_warning!(
            "LIFECYCLE",
            "'{current}' is enabled; ignoring requested profile '{requested}'"
        );
    }
}
