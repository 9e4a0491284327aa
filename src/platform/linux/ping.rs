//! Latency probe backed by the system `ping` utility.

use std::process::Command;

use crate::log_debug;
use crate::platform::LatencyProbe;

/// Sends `count` echo requests per host and reports the average round trip.
pub struct PingProbe {
    count: u32,
    timeout_secs: u64,
}

impl PingProbe {
    pub fn new(count: u32, timeout_secs: u64) -> Self {
        Self {
            count: count.max(1),
            timeout_secs,
        }
    }
}

impl LatencyProbe for PingProbe {
    fn measure(&self, host: &str) -> Option<f64> {
        let output = Command::new("ping")
            .args([
                "-c",
                &self.count.to_string(),
                "-W",
                &self.timeout_secs.to_string(),
                host,
            ])
            .output()
            .ok()?;

        if !output.status.success() {
            log_debug!("DIAG", "ping {host} exited with {}", output.status);
            return None;
        }

        let stats = parse_ping_output(&String::from_utf8_lossy(&output.stdout));
        log_debug!("DIAG", "ping {host}: {:.1}% packet loss", stats.packet_loss);
        stats.latency_ms
    }
}

/// Parsed ping output statistics.
#[derive(Debug, Default, PartialEq)]
pub struct PingStats {
    /// Average round trip, absent when no reply summary was printed.
    pub latency_ms: Option<f64>,
    pub packet_loss: f32,
}

/// Parse ping command output to extract average latency and packet loss.
///
/// Handles both Linux and BSD summaries:
/// - Linux: "rtt min/avg/max/mdev = 1.234/5.678/9.012/3.456 ms"
/// - BSD: "round-trip min/avg/max/stddev = 1.234/5.678/9.012/3.456 ms"
/// - loss: "10 packets transmitted, 8 received, 20% packet loss, time 9001ms"
pub fn parse_ping_output(output: &str) -> PingStats {
    let mut stats = PingStats::default();

    for line in output.lines() {
        if let Some(loss_idx) = line.find("% packet loss") {
            let before_loss = &line[..loss_idx];
            if let Some(percent_str) = before_loss
                .split([',', ' '])
                .filter(|s| !s.is_empty())
                .rfind(|s| s.chars().all(|c| c.is_ascii_digit() || c == '.'))
            {
                if let Ok(val) = percent_str.parse::<f32>() {
                    stats.packet_loss = val;
                }
            }
        }

        if line.contains("min/avg/max") {
            if let Some(eq_pos) = line.find('=') {
                let values: Vec<&str> = line[eq_pos + 1..].trim().split('/').collect();
                if values.len() >= 4 {
                    stats.latency_ms = values[1].trim().parse::<f64>().ok();
                }
            }
        }
    }

    stats
}
