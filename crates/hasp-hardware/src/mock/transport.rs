//! Mock RS485 transport for testing and hardware-less deployments.

use crate::{
    Result,
    error::TransportError,
    traits::{DispatchAck, SerialTransport},
};
use hasp_protocol::CommandFrame;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted outcome for a single mock dispatch.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Acknowledge immediately.
    Ack,
    /// Acknowledge after the given delay (exercises caller timeouts).
    AckAfter(Duration),
    /// Answer with a negative acknowledgment code.
    Nack(u8),
    /// Fail as if the port vanished mid-write.
    Disconnected,
    /// Never answer; the caller's timeout must fire.
    Hang,
}

#[derive(Debug, Default)]
struct MockState {
    /// Outcomes consumed front-to-back; empty queue means instant ack.
    script: VecDeque<MockOutcome>,
    /// Every frame handed to `send`, in dispatch order.
    sent: Vec<CommandFrame>,
    /// Simulated link state.
    connected: bool,
}

/// Mock serial transport.
///
/// The transport and its [`MockTransportHandle`] share state: the handle
/// scripts per-dispatch outcomes and inspects the frames that were sent,
/// while the transport consumes the script one outcome per `send` call.
/// With nothing scripted, every send acknowledges instantly.
///
/// # Examples
///
/// ```
/// use hasp_hardware::mock::MockTransport;
/// use hasp_hardware::traits::SerialTransport;
/// use hasp_protocol::encode;
///
/// #[tokio::main]
/// async fn main() -> hasp_hardware::Result<()> {
///     let (mut bus, handle) = MockTransport::new();
///
///     let frame = encode(2, 7).unwrap();
///     bus.send(&frame).await?;
///
///     assert_eq!(handle.sent_frames(), vec![frame]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport and its control handle.
    pub fn new() -> (Self, MockTransportHandle) {
        let state = Arc::new(Mutex::new(MockState {
            script: VecDeque::new(),
            sent: Vec::new(),
            connected: true,
        }));

        let transport = Self {
            state: Arc::clone(&state),
        };
        let handle = MockTransportHandle { state };

        (transport, handle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // Mock state is only ever touched in short critical sections;
        // a poisoned lock means a test already panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new().0
    }
}

impl SerialTransport for MockTransport {
    async fn send(&mut self, frame: &CommandFrame) -> Result<DispatchAck> {
        let outcome = {
            let mut state = self.lock();

            if !state.connected {
                return Err(TransportError::disconnected("mock"));
            }

            state.sent.push(*frame);
            state.script.pop_front().unwrap_or(MockOutcome::Ack)
        };

        match outcome {
            MockOutcome::Ack => Ok(DispatchAck::now()),
            MockOutcome::AckAfter(delay) => {
                tokio::time::sleep(delay).await;
                Ok(DispatchAck::now())
            }
            MockOutcome::Nack(code) => Err(TransportError::nack(code)),
            MockOutcome::Disconnected => {
                self.lock().connected = false;
                Err(TransportError::disconnected("mock"))
            }
            MockOutcome::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }

    async fn is_connected(&self) -> bool {
        self.lock().connected
    }
}

/// Control handle for a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockTransportHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue an outcome for the next unscripted dispatch.
    pub fn script(&self, outcome: MockOutcome) {
        self.lock().script.push_back(outcome);
    }

    /// All frames dispatched so far, in order.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<CommandFrame> {
        self.lock().sent.clone()
    }

    /// Number of frames dispatched so far.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.lock().sent.len()
    }

    /// Simulate plugging or unplugging the bus.
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }
}
