//! Lifecycle transition types.

use std::fmt;

/// One supervisor request against a profile's unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Enable(String),
    Disable(String),
    Start(String),
    Stop(String),
    Restart(String),
}

impl Step {
    /// Profile the step applies to.
    pub fn profile(&self) -> &str {
        match self {
            Self::Enable(p)
            | Self::Disable(p)
            | Self::Start(p)
            | Self::Stop(p)
            | Self::Restart(p) => p,
        }
    }

    /// The supervisor verb.
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Enable(_) => "enable",
            Self::Disable(_) => "disable",
            Self::Start(_) => "start",
            Self::Stop(_) => "stop",
            Self::Restart(_) => "restart",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.action(), self.profile())
    }
}

/// Outcome of the dependent name-resolution restart.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ResolverRestart {
    /// The transition does not change the running profile, or the restart was deferred.
    #[default]
    NotRequested,
    /// The resolver was enabled and restarted.
    Restarted,
    /// The resolver is not registered for auto-start.
    Skipped,
    /// The restart (or the is-enabled query) failed; the transition still stands.
    Failed(String),
}

/// What a completed lifecycle operation did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionReport {
    /// Steps applied, in order.
    pub steps: Vec<Step>,
    pub resolver: ResolverRestart,
}

/// Currently enabled profile and whether it is running.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveProfile {
    pub name: String,
    pub active: bool,
}
