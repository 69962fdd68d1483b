//! Serial transport trait definition.
//!
//! The transport is the seam between the deterministic core (frame
//! encoding, reservation logic) and the physical RS485 bus. Everything on
//! this side of the seam is swappable: tests and hardware-less deployments
//! use [`MockTransport`](crate::mock::MockTransport), production uses the
//! `serial`-feature implementation over a real port.
//!
//! Traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use chrono::{DateTime, Utc};
use hasp_protocol::CommandFrame;

/// Acknowledgment returned by a successful frame dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchAck {
    /// Instant the acknowledgment was observed.
    pub acked_at: DateTime<Utc>,
}

impl DispatchAck {
    /// Create an acknowledgment stamped with the current time.
    #[must_use]
    pub fn now() -> Self {
        Self {
            acked_at: Utc::now(),
        }
    }
}

/// RS485 serial transport abstraction.
///
/// A transport delivers one complete command frame to the bus and waits
/// for the controller's acknowledgment within a bounded timeout. Callers
/// must serialize sends that target the same bus address; the transport
/// itself only guarantees that a single `send` call writes one contiguous
/// frame.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future` (Edition 2024 RPITIT); `Box<dyn SerialTransport>` will
/// not compile. Use generic type parameters, or the
/// [`AnyTransport`](crate::transports::AnyTransport) enum wrapper when a
/// single concrete field must hold either implementation.
///
/// # Examples
///
/// ```no_run
/// use hasp_hardware::traits::SerialTransport;
/// use hasp_hardware::error::Result;
/// use hasp_protocol::CommandFrame;
///
/// async fn dispatch<T: SerialTransport>(bus: &mut T, frame: &CommandFrame) -> Result<()> {
///     let ack = bus.send(frame).await?;
///     println!("acked at {}", ack.acked_at);
///     Ok(())
/// }
/// ```
pub trait SerialTransport: Send + Sync {
    /// Send one command frame and wait for acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No acknowledgment arrives within the configured timeout
    /// - The port is disconnected
    /// - The controller answers with a negative acknowledgment
    /// - An I/O error occurs on the underlying port
    async fn send(&mut self, frame: &CommandFrame) -> Result<DispatchAck>;

    /// Check whether the transport currently has a usable connection.
    ///
    /// This is a best-effort, non-blocking check.
    async fn is_connected(&self) -> bool;
}
