//! RS485 wire protocol for locker controller boards.
//!
//! The only command the engine emits is the 10-byte compartment open
//! frame. Encoding is pure and fully deterministic, which keeps the
//! hardware boundary trivially testable: everything up to the serial
//! write can run in unit tests byte-for-byte.

pub mod frame;

pub use frame::{CommandFrame, encode};
