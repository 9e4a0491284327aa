//! Linux platform implementations.
//!
//! Uses `systemctl` for service supervision and `ping` for latency.

pub mod ping;
pub mod systemd;
