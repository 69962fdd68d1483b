use hasp_core::constants::{
    DEFAULT_DISPATCH_TIMEOUT_MS, DEFAULT_START_TOLERANCE_SECS, DEFAULT_SWEEP_INTERVAL_SECS,
    MAX_DISPATCH_TIMEOUT_MS, MIN_DISPATCH_TIMEOUT_MS,
};
use hasp_core::{Error, Result};
use std::time::Duration;

/// Engine configuration
///
/// Collects the tunable policy values shared by the reservation engine,
/// the locker controller and the expiration sweeper. Defaults match the
/// constants in `hasp-core`; deployments override them per instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How far in the past a booking start time may lie and still be
    /// accepted, absorbing clock and request latency skew
    pub start_tolerance_secs: i64,

    /// Upper bound on a single hardware dispatch, send plus acknowledgment
    pub dispatch_timeout: Duration,

    /// Interval between expiration sweep ticks
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_tolerance_secs: DEFAULT_START_TOLERANCE_SECS,
            dispatch_timeout: Duration::from_millis(DEFAULT_DISPATCH_TIMEOUT_MS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl EngineConfig {
    /// Set the booking start tolerance in seconds.
    pub fn start_tolerance_secs(mut self, secs: i64) -> Self {
        self.start_tolerance_secs = secs;
        self
    }

    /// Set the hardware dispatch timeout.
    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = timeout;
        self
    }

    /// Set the expiration sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// Returns `Error::Config` if the dispatch timeout is outside the
    /// allowed range or the start tolerance is negative.
    pub fn validate(&self) -> Result<()> {
        let timeout_ms = self.dispatch_timeout.as_millis() as u64;
        if !(MIN_DISPATCH_TIMEOUT_MS..=MAX_DISPATCH_TIMEOUT_MS).contains(&timeout_ms) {
            return Err(Error::Config(format!(
                "dispatch timeout must be {MIN_DISPATCH_TIMEOUT_MS}-{MAX_DISPATCH_TIMEOUT_MS} ms, got {timeout_ms}"
            )));
        }

        if self.start_tolerance_secs < 0 {
            return Err(Error::Config(format!(
                "start tolerance must be non-negative, got {}",
                self.start_tolerance_secs
            )));
        }

        if self.sweep_interval.is_zero() {
            return Err(Error::Config(
                "sweep interval must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
