//! Core profile management.
//!
//! - `tracker`: derives the enabled/active profile from the supervisor
//! - `lifecycle`: enable/start/restart/switch/stop/disable transitions
//! - `diagnostics`: listing, country codes and latency ranking
//! - `prompt`: operator confirmation before overriding an enabled profile

pub mod diagnostics;
pub mod lifecycle;
pub mod prompt;
pub mod tracker;

pub use diagnostics::{DiagnosticsReporter, Measurement};
pub use lifecycle::LifecycleController;
pub use tracker::ActiveProfileTracker;
