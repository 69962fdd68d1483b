use crate::{
    Result,
    constants::{
        ACCESS_CODE_LENGTH, MAX_LOCKER_NUMBER, MAX_RS485_ADDRESS, MIN_LOCKER_NUMBER,
        MIN_RS485_ADDRESS,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RS485 controller board address (0-31)
///
/// Each locker cabinet controller sits on the shared bus at a unique
/// address. A wrong address routes the open command to a different
/// cabinet, so the range is validated at construction and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rs485Address(u8);

impl Rs485Address {
    /// Create a new bus address with validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the address is outside 0-31.
    pub fn new(address: u8) -> Result<Self> {
        if !(MIN_RS485_ADDRESS..=MAX_RS485_ADDRESS).contains(&address) {
            return Err(Error::Validation(format!(
                "RS485 address must be {MIN_RS485_ADDRESS}-{MAX_RS485_ADDRESS}, got {address}"
            )));
        }
        Ok(Rs485Address(address))
    }

    /// Get the raw address as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rs485Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl std::str::FromStr for Rs485Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let address: u8 = s
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid RS485 address: {s}")))?;
        Rs485Address::new(address)
    }
}

/// Compartment number on a controller board (1-24)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockerNumber(u8);

impl LockerNumber {
    /// Create a new compartment number with validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the number is outside 1-24.
    pub fn new(number: u8) -> Result<Self> {
        if !(MIN_LOCKER_NUMBER..=MAX_LOCKER_NUMBER).contains(&number) {
            return Err(Error::Validation(format!(
                "Locker number must be {MIN_LOCKER_NUMBER}-{MAX_LOCKER_NUMBER}, got {number}"
            )));
        }
        Ok(LockerNumber(number))
    }

    /// Get the raw compartment number as u8.
    #[must_use]
    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for LockerNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl std::str::FromStr for LockerNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let number: u8 = s
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid locker number: {s}")))?;
        LockerNumber::new(number)
    }
}

/// Operational status of a physical locker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockerStatus {
    /// Free for booking.
    Available,
    /// Physically holding an item.
    Occupied,
    /// Taken out of service; open commands are refused.
    Maintenance,
    /// Held by an active reservation.
    Reserved,
}

impl LockerStatus {
    /// Database column representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LockerStatus::Available => "available",
            LockerStatus::Occupied => "occupied",
            LockerStatus::Maintenance => "maintenance",
            LockerStatus::Reserved => "reserved",
        }
    }

    /// Parse from the database column representation.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an unrecognized status string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(LockerStatus::Available),
            "occupied" => Ok(LockerStatus::Occupied),
            "maintenance" => Ok(LockerStatus::Maintenance),
            "reserved" => Ok(LockerStatus::Reserved),
            _ => Err(Error::Validation(format!("Invalid locker status: {s}"))),
        }
    }

    /// Returns `true` if open commands may be dispatched in this status.
    #[must_use]
    pub fn is_openable(&self) -> bool {
        !matches!(self, LockerStatus::Maintenance)
    }
}

impl fmt::Display for LockerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a reservation
///
/// `Active` is the only non-terminal state. Terminal reservations are
/// retained for audit and never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Live booking; holds the locker and participates in conflict checks.
    Active,
    /// Withdrawn by user or admin action.
    Cancelled,
    /// Item picked up and booking closed.
    Completed,
    /// End time passed while still active; closed by the sweep.
    Expired,
}

impl ReservationStatus {
    /// Database column representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Expired => "expired",
        }
    }

    /// Parse from the database column representation.
    ///
    /// # Errors
    /// Returns `Error::Validation` for an unrecognized status string.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(ReservationStatus::Active),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            "expired" => Ok(ReservationStatus::Expired),
            _ => Err(Error::Validation(format!(
                "Invalid reservation status: {s}"
            ))),
        }
    }

    /// Returns `true` for states that never transition again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReservationStatus::Active)
    }

    /// Check whether a transition to `target` is allowed.
    ///
    /// Only `Active` may move, and only to a terminal state. Terminal
    /// states accept nothing; idempotent re-application is handled one
    /// level up by reporting a no-op instead of attempting a transition.
    #[must_use]
    pub fn can_transition_to(&self, target: &ReservationStatus) -> bool {
        matches!(
            (self, target),
            (
                ReservationStatus::Active,
                ReservationStatus::Cancelled
                    | ReservationStatus::Completed
                    | ReservationStatus::Expired
            )
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pickup code for an active reservation (8 chars, `[0-9A-Z]`)
///
/// Codes are normalized to uppercase before validation. Uniqueness is
/// only required among currently active reservations, which the generator
/// enforces against the store; this type only guards the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccessCode(String);

impl AccessCode {
    /// Create a new access code with validation.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the code is not exactly 8
    /// alphanumeric ASCII characters.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim().to_uppercase();

        if code.len() != ACCESS_CODE_LENGTH {
            return Err(Error::Validation(format!(
                "Access code must be {ACCESS_CODE_LENGTH} chars, got {}",
                code.len()
            )));
        }

        if !code.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(Error::Validation(
                "Access code must be alphanumeric ASCII".to_string(),
            ));
        }

        Ok(AccessCode(code))
    }

    /// Get the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccessCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AccessCode::new(s)
    }
}
