//! Enum wrapper for transport dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) are not object-safe,
//! so `Box<dyn SerialTransport>` cannot exist. This enum provides concrete
//! type dispatch at compile time instead: zero-cost, type-safe, and
//! feature-flag friendly.

use crate::mock::MockTransport;
use crate::traits::{DispatchAck, SerialTransport};
use crate::{CommandFrame, Result};

/// Enum wrapper for serial transport dispatch.
///
/// # Examples
///
/// ```
/// use hasp_hardware::transports::AnyTransport;
/// use hasp_hardware::mock::MockTransport;
/// use hasp_hardware::traits::SerialTransport;
/// use hasp_protocol::encode;
///
/// #[tokio::main]
/// async fn main() -> hasp_hardware::Result<()> {
///     let (bus, _handle) = MockTransport::new();
///     let mut any_bus = AnyTransport::Mock(bus);
///
///     let frame = encode(2, 7).unwrap();
///     any_bus.send(&frame).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyTransport {
    /// Mock transport for tests and hardware-less deployments.
    Mock(MockTransport),

    /// Real RS485 bus over a serial port.
    #[cfg(feature = "serial")]
    Serial(crate::serial::SerialPortTransport),
}

impl SerialTransport for AnyTransport {
    async fn send(&mut self, frame: &CommandFrame) -> Result<DispatchAck> {
        match self {
            Self::Mock(transport) => transport.send(frame).await,
            #[cfg(feature = "serial")]
            Self::Serial(transport) => transport.send(frame).await,
        }
    }

    async fn is_connected(&self) -> bool {
        match self {
            Self::Mock(transport) => transport.is_connected().await,
            #[cfg(feature = "serial")]
            Self::Serial(transport) => transport.is_connected().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hasp_protocol::encode;

    #[tokio::test]
    async fn test_any_transport_mock_dispatch() {
        let (bus, handle) = MockTransport::new();
        let mut any_bus = AnyTransport::Mock(bus);

        let frame = encode(4, 11).unwrap();
        any_bus.send(&frame).await.unwrap();

        assert!(any_bus.is_connected().await);
        assert_eq!(handle.sent_frames(), vec![frame]);
    }
}
