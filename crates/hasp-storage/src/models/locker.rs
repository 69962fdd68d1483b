use chrono::{DateTime, Utc};
use hasp_core::{LockerNumber, LockerStatus, Result, Rs485Address};
use serde::{Deserialize, Serialize};

/// Locker entity: one physical compartment on the RS485 bus
///
/// The `(rs485_address, rs485_locker_number)` pair is the hardware
/// identity of the compartment and is unique across all lockers — the
/// database enforces this with a unique index, and the registry checks it
/// again before every write so the violation surfaces as a validation
/// error rather than a constraint failure.
///
/// Raw integer columns are re-validated through the [`Rs485Address`] and
/// [`LockerNumber`] newtypes before any frame is built from them, so a
/// corrupted row can never produce a partial or misaddressed frame.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Locker {
    /// Auto-increment primary key
    pub id: i64,

    /// Controller board address on the bus (0-31)
    pub rs485_address: i64,

    /// Compartment number on the board (1-24)
    pub rs485_locker_number: i64,

    /// Current status (`available`, `occupied`, `maintenance`, `reserved`)
    pub status: String,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Record last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Locker {
    /// Parse the stored status column.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the column holds an unknown value.
    pub fn locker_status(&self) -> Result<LockerStatus> {
        LockerStatus::parse(&self.status)
    }

    /// Validated bus address.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the stored address is out of range.
    pub fn address(&self) -> Result<Rs485Address> {
        Rs485Address::new(u8::try_from(self.rs485_address).map_err(|_| {
            hasp_core::Error::Validation(format!(
                "Stored RS485 address {} does not fit in u8",
                self.rs485_address
            ))
        })?)
    }

    /// Validated compartment number.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the stored number is out of range.
    pub fn number(&self) -> Result<LockerNumber> {
        LockerNumber::new(u8::try_from(self.rs485_locker_number).map_err(|_| {
            hasp_core::Error::Validation(format!(
                "Stored locker number {} does not fit in u8",
                self.rs485_locker_number
            ))
        })?)
    }

    /// Returns `true` if the locker is under maintenance.
    #[must_use]
    pub fn in_maintenance(&self) -> bool {
        self.status == LockerStatus::Maintenance.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_locker() -> Locker {
        Locker {
            id: 1,
            rs485_address: 2,
            rs485_locker_number: 7,
            status: "available".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parsing() {
        let locker = sample_locker();
        assert_eq!(locker.locker_status().unwrap(), LockerStatus::Available);
        assert!(!locker.in_maintenance());
    }

    #[test]
    fn test_hardware_fields_validated() {
        let locker = sample_locker();
        assert_eq!(locker.address().unwrap().as_u8(), 2);
        assert_eq!(locker.number().unwrap().as_u8(), 7);
    }

    #[test]
    fn test_corrupt_row_is_rejected() {
        let mut locker = sample_locker();
        locker.rs485_address = 99;
        assert!(locker.address().is_err());

        locker.rs485_locker_number = 0;
        assert!(locker.number().is_err());
    }
}
