//! Error types for serial transport operations.
//!
//! Transport failures are reported, never fatal: the locker controller
//! turns them into a failed `OpenResult` rather than propagating a crash
//! into the serving process.

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors that can occur while dispatching a frame on the RS485 bus.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No acknowledgment arrived within the bounded timeout.
    #[error("Dispatch timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Serial port is gone or was never opened.
    #[error("Transport disconnected: {port}")]
    Disconnected { port: String },

    /// Controller board answered with a negative acknowledgment.
    #[error("Controller rejected frame: code {code:#04X}")]
    Nack { code: u8 },

    /// Transport configuration problem (bad port name, baud rate).
    #[error("Transport configuration error: {message}")]
    Configuration { message: String },

    /// Generic I/O error on the underlying port.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new disconnected error.
    pub fn disconnected(port: impl Into<String>) -> Self {
        Self::Disconnected { port: port.into() }
    }

    /// Create a new negative-acknowledgment error.
    pub fn nack(code: u8) -> Self {
        Self::Nack { code }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
