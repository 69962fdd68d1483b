//! Reservation conflict detection.
//!
//! Windows are half-open `[start, end)` intervals, so the overlap test is
//! the strict form `existing.start < end && start < existing.end`. A
//! booking ending at 11:00 and another starting at 11:00 on the same
//! locker do not conflict. Only ACTIVE reservations participate; terminal
//! reservations are history, not holds.

use chrono::{DateTime, Utc};
use hasp_core::{Error, Result};
use hasp_storage::models::Reservation;
use hasp_storage::repositories::{ReservationRepository, SqliteReservationRepository};
use hasp_storage::transaction;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// Outcome of a conflict check against one locker and window.
#[derive(Debug, Clone)]
pub struct ConflictReport {
    /// Locker the check ran against.
    pub locker_id: i64,
    /// Active reservations whose window overlaps the candidate window.
    pub conflicting: Vec<Reservation>,
}

impl ConflictReport {
    /// Returns `true` if the window is free to book.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.conflicting.is_empty()
    }

    /// IDs of the conflicting reservations.
    #[must_use]
    pub fn conflicting_ids(&self) -> Vec<i64> {
        self.conflicting.iter().map(|r| r.id).collect()
    }

    /// Convert a non-clear report into the booking conflict error.
    #[must_use]
    pub fn into_error(self) -> Option<Error> {
        if self.conflicting.is_empty() {
            return None;
        }
        Some(Error::Conflict {
            locker_id: self.locker_id,
            conflicting: self.conflicting.iter().map(|r| r.id).collect(),
        })
    }
}

/// Checks candidate booking windows against active reservations.
pub struct ConflictChecker {
    reservations: SqliteReservationRepository,
}

impl ConflictChecker {
    /// Create a new checker over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            reservations: SqliteReservationRepository::new(pool),
        }
    }

    /// Check `[start, end)` on `locker_id` for conflicts.
    ///
    /// `exclude` skips one reservation ID, used when re-validating an
    /// edited booking against everything except itself.
    ///
    /// # Errors
    /// Returns `Error::Validation` if `start >= end`, or a storage error
    /// if the lookup fails.
    pub async fn check(
        &self,
        locker_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i64>,
    ) -> Result<ConflictReport> {
        validate_ordering(start, end)?;

        let conflicting = self
            .reservations
            .find_active_overlapping(locker_id, start, end, exclude)
            .await?;

        Ok(ConflictReport {
            locker_id,
            conflicting,
        })
    }
}

/// Conflict check inside an open booking transaction.
///
/// The booking path must see a snapshot consistent with its own insert,
/// so it checks through the transaction instead of the pool.
pub async fn check_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    locker_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<ConflictReport> {
    validate_ordering(start, end)?;

    let conflicting = transaction::find_active_overlapping(tx, locker_id, start, end).await?;

    Ok(ConflictReport {
        locker_id,
        conflicting,
    })
}

fn validate_ordering(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start >= end {
        return Err(Error::validation(format!(
            "start_time must precede end_time ({start} >= {end})"
        )));
    }
    Ok(())
}
