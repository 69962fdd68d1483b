//! Background expiration sweep.
//!
//! Expiration is sweep-driven: nothing fires at the exact end instant of
//! a reservation. Every tick the sweeper asks the engine to expire all
//! overdue active reservations, which also makes it self-healing after
//! downtime; the first tick after a restart catches everything that
//! lapsed while the process was down.

use crate::lifecycle::ReservationEngine;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Periodic task expiring overdue reservations.
pub struct ExpirationSweeper {
    engine: Arc<ReservationEngine>,
    interval: Duration,
}

impl ExpirationSweeper {
    /// Create a new sweeper driving the given engine.
    pub fn new(engine: Arc<ReservationEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Spawn the sweep loop on the current runtime.
    ///
    /// The task runs until the handle is aborted or the runtime shuts
    /// down. Sweep failures are logged and the loop continues; a flaky
    /// database read must not kill the sweeper.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// The sweep loop itself, exposed for callers that want to drive it
    /// inside their own task or select arm.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        // A slow sweep should not cause a burst of catch-up ticks
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.engine.evaluate_expirations(Utc::now()).await {
                Ok(0) => debug!("expiration sweep found nothing overdue"),
                Ok(count) => debug!(count, "expiration sweep finished"),
                Err(e) => error!(error = %e, "expiration sweep failed"),
            }
        }
    }
}
