//! Real RS485 transport over a serial port (feature `serial`).
//!
//! The `serialport` crate is blocking, so writes and the acknowledgment
//! read run on the blocking thread pool via `spawn_blocking`. The port's
//! own read timeout bounds the acknowledgment wait; callers layer their
//! dispatch timeout on top.

use crate::{
    Result,
    error::TransportError,
    traits::{DispatchAck, SerialTransport},
};
use hasp_core::constants::DEFAULT_DISPATCH_TIMEOUT_MS;
use hasp_protocol::CommandFrame;
use std::io::{Read, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Positive acknowledgment byte from a controller board (ASCII ACK).
const ACK_BYTE: u8 = 0x06;

/// Serial port configuration for the RS485 bus.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Port path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,

    /// Baud rate; locker controller boards run 9600 8N1.
    pub baud_rate: u32,

    /// Read timeout applied to the acknowledgment wait.
    pub timeout: Duration,
}

impl SerialConfig {
    /// Create a configuration for the given port with defaults.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: 9600,
            timeout: Duration::from_millis(DEFAULT_DISPATCH_TIMEOUT_MS),
        }
    }

    /// Set the baud rate.
    #[must_use]
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the acknowledgment read timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// RS485 transport backed by a physical serial port.
pub struct SerialPortTransport {
    config: SerialConfig,
    port: Option<Arc<Mutex<Box<dyn serialport::SerialPort>>>>,
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("config", &self.config)
            .field("connected", &self.port.is_some())
            .finish()
    }
}

impl SerialPortTransport {
    /// Open the configured serial port.
    ///
    /// # Errors
    /// Returns `TransportError::Configuration` if the port cannot be
    /// opened with the requested settings.
    pub fn open(config: SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(config.timeout)
            .open()
            .map_err(|e| {
                TransportError::configuration(format!(
                    "Failed to open {}: {}",
                    config.port, e
                ))
            })?;

        debug!(port = %config.port, baud = config.baud_rate, "serial port opened");

        Ok(Self {
            config,
            port: Some(Arc::new(Mutex::new(port))),
        })
    }
}

impl SerialTransport for SerialPortTransport {
    async fn send(&mut self, frame: &CommandFrame) -> Result<DispatchAck> {
        let port = self
            .port
            .clone()
            .ok_or_else(|| TransportError::disconnected(self.config.port.clone()))?;

        let bytes = *frame.as_bytes();
        let timeout_ms = self.config.timeout.as_millis() as u64;

        let outcome = tokio::task::spawn_blocking(move || {
            let mut guard = port.lock().unwrap_or_else(|e| e.into_inner());
            guard.write_all(&bytes)?;
            guard.flush()?;

            let mut ack = [0u8; 1];
            guard.read_exact(&mut ack)?;
            Ok::<u8, std::io::Error>(ack[0])
        })
        .await
        .map_err(|e| TransportError::configuration(format!("blocking task failed: {e}")))?;

        match outcome {
            Ok(ACK_BYTE) => Ok(DispatchAck::now()),
            Ok(code) => {
                warn!(code = format_args!("{code:#04X}"), "controller nack");
                Err(TransportError::nack(code))
            }
            // Timeout keeps the port: retrying the same frame is safe
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(TransportError::timeout(timeout_ms))
            }
            Err(e) => {
                self.port = None;
                Err(TransportError::Io(e))
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.port.is_some()
    }
}
