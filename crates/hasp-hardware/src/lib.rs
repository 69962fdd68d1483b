//! Serial transport layer for the hasp locker access engine.
//!
//! This crate owns the seam between the deterministic core and the RS485
//! bus that drives the locker controller boards. The core hands a fully
//! encoded [`CommandFrame`] to a [`SerialTransport`]; everything past that
//! call is physical.
//!
//! # Design
//!
//! - **Async-first**: transports expose native `async fn` trait methods
//!   (Rust 1.90 + Edition 2024 RPITIT), no `async_trait` macro.
//! - **Swappable**: [`MockTransport`](mock::MockTransport) for tests and
//!   hardware-less deployments, `SerialPortTransport` (feature `serial`)
//!   for a real bus. [`AnyTransport`](transports::AnyTransport) wraps both
//!   for concrete-type dispatch.
//! - **Reported failures**: dispatch errors are values, never panics; the
//!   engine converts them into failed open results.
//!
//! # Examples
//!
//! ```
//! use hasp_hardware::mock::MockTransport;
//! use hasp_hardware::traits::SerialTransport;
//! use hasp_protocol::encode;
//!
//! #[tokio::main]
//! async fn main() -> hasp_hardware::Result<()> {
//!     let (mut bus, handle) = MockTransport::new();
//!     let frame = encode(2, 7).unwrap();
//!
//!     let ack = bus.send(&frame).await?;
//!     assert_eq!(handle.sent_count(), 1);
//!     println!("dispatched at {}", ack.acked_at);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod mock;
#[cfg(feature = "serial")]
pub mod serial;
pub mod traits;
pub mod transports;

// Re-export commonly used types for convenience
pub use error::{Result, TransportError};
pub use hasp_protocol::CommandFrame;
pub use traits::{DispatchAck, SerialTransport};
pub use transports::AnyTransport;

#[cfg(feature = "serial")]
pub use serial::{SerialConfig, SerialPortTransport};
