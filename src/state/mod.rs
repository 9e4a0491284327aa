//! Domain state types for wgswitch.
//!
//! - `transition`: lifecycle steps, dependent-restart outcomes and reports

mod transition;

pub use transition::{ActiveProfile, ResolverRestart, Step, TransitionReport};
