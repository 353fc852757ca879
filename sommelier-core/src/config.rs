use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sommelier_model::ScanStage;

/// Knobs for the lifecycle controller actor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Depth of the command queue between handles and the actor.
    pub command_buffer: usize,
    /// Capacity of the lifecycle event broadcast channel. Slow subscribers
    /// beyond this lag and miss events; snapshots are unaffected.
    pub event_capacity: usize,
    /// Write live results to the offline store so they can be replayed when
    /// the network is down.
    pub cache_completed_scans: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            command_buffer: 32,
            event_capacity: 64,
            cache_completed_scans: true,
        }
    }
}

/// Connectivity monitoring.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkMonitorConfig {
    /// Quiet period (ms) a raw connectivity signal must hold before it is
    /// published. Absorbs flapping radios.
    pub debounce_ms: u64,
    /// Endpoint polled by the reachability probe. Unset disables the probe.
    pub probe_url: Option<String>,
    pub probe_interval_ms: u64,
    pub probe_timeout_ms: u64,
}

impl Default for NetworkMonitorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            probe_url: None,
            probe_interval_ms: 10_000,
            probe_timeout_ms: 3_000,
        }
    }
}

impl NetworkMonitorConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.max(1))
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms.max(1))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.max(1))
    }
}

/// Timing and failure injection for the simulated scan service.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub capture_delay_ms: u64,
    pub process_delay_ms: u64,
    pub analyze_delay_ms: u64,
    /// Fail the pipeline when this stage runs.
    pub fail_at: Option<ScanStage>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            capture_delay_ms: 1_500,
            process_delay_ms: 1_500,
            analyze_delay_ms: 2_000,
            fail_at: None,
        }
    }
}

impl SimulatorConfig {
    /// Zero delays, for tests and scripted demos.
    pub fn instant() -> Self {
        Self {
            capture_delay_ms: 0,
            process_delay_ms: 0,
            analyze_delay_ms: 0,
            fail_at: None,
        }
    }

    pub fn delay_for(&self, stage: ScanStage) -> Duration {
        let millis = match stage {
            ScanStage::Capturing => self.capture_delay_ms,
            ScanStage::Processing => self.process_delay_ms,
            ScanStage::Analyzing => self.analyze_delay_ms,
            ScanStage::Idle | ScanStage::Complete | ScanStage::Error => 0,
        };
        Duration::from_millis(millis)
    }
}

/// Location of the persistent offline cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineCacheConfig {
    pub dir: PathBuf,
    /// Cache entries are keyed by session; one key holds one result list.
    pub session_key: String,
}

impl Default for OfflineCacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./cache/offline"),
            session_key: "default".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debounce_window_never_collapses_to_zero() {
        let config = NetworkMonitorConfig {
            debounce_ms: 0,
            ..NetworkMonitorConfig::default()
        };
        assert_eq!(config.debounce_window(), Duration::from_millis(1));
        assert_eq!(
            NetworkMonitorConfig::default().debounce_window(),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn simulator_delays_follow_stage() {
        let config = SimulatorConfig::default();
        assert_eq!(
            config.delay_for(ScanStage::Analyzing),
            Duration::from_millis(2_000)
        );
        assert_eq!(config.delay_for(ScanStage::Complete), Duration::ZERO);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: ControllerConfig =
            serde_json::from_str(r#"{"cache_completed_scans": false}"#)
                .unwrap();
        assert!(!config.cache_completed_scans);
        assert_eq!(config.command_buffer, 32);
    }
}
