//! Core constants for the locker access-control engine.
//!
//! This module centralizes the RS485 command frame layout, hardware
//! addressing limits, and the reservation policy defaults used throughout
//! the workspace. The frame constants are dictated by the locker controller
//! boards on the bus; modifying them will address the wrong compartment.
//!
//! # Frame Structure
//!
//! The open-locker command is a fixed 10-byte binary frame:
//!
//! ```text
//! [0x5A][0x5A][0x00][address][0x00][0x04][0x00][0x01][locker][checksum]
//!   0     1     2      3       4     5     6     7      8        9
//! ```
//!
//! Bytes 0-1 are the frame preamble, byte 3 selects the controller board
//! on the bus, byte 8 selects the compartment on that board, and byte 9 is
//! the XOR of bytes 0-8.

// ============================================================================
// RS485 Frame Layout
// ============================================================================

/// Total length of an open-locker command frame in bytes.
pub const FRAME_LEN: usize = 10;

/// Frame preamble byte, repeated at offsets 0 and 1.
pub const FRAME_PREAMBLE: u8 = 0x5A;

/// Fixed command-class byte at offset 5 (compartment open).
pub const FRAME_COMMAND_OPEN: u8 = 0x04;

/// Fixed operand byte at offset 7.
pub const FRAME_OPERAND: u8 = 0x01;

/// Offset of the controller board address within the frame.
pub const FRAME_ADDRESS_OFFSET: usize = 3;

/// Offset of the compartment number within the frame.
pub const FRAME_LOCKER_OFFSET: usize = 8;

/// Offset of the XOR checksum within the frame.
pub const FRAME_CHECKSUM_OFFSET: usize = 9;

// ============================================================================
// Hardware Addressing Limits
// ============================================================================

/// Minimum valid RS485 controller board address.
pub const MIN_RS485_ADDRESS: u8 = 0;

/// Maximum valid RS485 controller board address.
///
/// The bus supports 32 boards (0-31). Addresses above this value are
/// rejected before any frame byte is emitted.
pub const MAX_RS485_ADDRESS: u8 = 31;

/// Minimum valid compartment number on a controller board.
pub const MIN_LOCKER_NUMBER: u8 = 1;

/// Maximum valid compartment number on a controller board.
///
/// Each board drives up to 24 compartments (1-24).
pub const MAX_LOCKER_NUMBER: u8 = 24;

// ============================================================================
// Reservation Policy
// ============================================================================

/// Maximum reservation duration in seconds (7 days).
///
/// Bookings longer than this are rejected with a validation error at
/// creation and edit time.
pub const MAX_RESERVATION_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Default tolerance, in seconds, for a booking start time in the past.
///
/// A booking whose start lies within this window before "now" is accepted,
/// absorbing clock and request latency skew. The value is a policy default
/// carried over from observed deployments, not a protocol requirement, so
/// it is configurable per engine instance.
pub const DEFAULT_START_TOLERANCE_SECS: i64 = 60;

// ============================================================================
// Access Codes
// ============================================================================

/// Length of generated reservation and access codes in characters.
pub const ACCESS_CODE_LENGTH: usize = 8;

/// Alphabet for generated codes: digits and uppercase ASCII letters.
pub const ACCESS_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Maximum regeneration attempts before code generation fails.
///
/// With an 8-character code over a 36-symbol alphabet the collision space
/// is 36^8, so exhausting this bound is statistically unreachable at
/// normal load and indicates a broken randomness source or a store fault.
pub const MAX_CODE_ATTEMPTS: u32 = 10;

// ============================================================================
// Timing Defaults
// ============================================================================

/// Default timeout for a hardware dispatch (milliseconds).
///
/// A single open command plus acknowledgment completes well under a second
/// on a healthy bus; 3 seconds leaves margin for a congested line.
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 3000;

/// Minimum allowed dispatch timeout (milliseconds).
pub const MIN_DISPATCH_TIMEOUT_MS: u64 = 500;

/// Maximum allowed dispatch timeout (milliseconds).
pub const MAX_DISPATCH_TIMEOUT_MS: u64 = 10000;

/// Default interval between expiration sweep ticks (seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
