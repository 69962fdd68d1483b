//! Mock transport implementation for testing and development.
//!
//! This is also the transport-less deployment mode: with no outcomes
//! scripted, every dispatch acknowledges immediately, so environments
//! without attached hardware get simulated successes.

mod transport;

pub use transport::{MockOutcome, MockTransport, MockTransportHandle};
