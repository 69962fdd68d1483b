//! Reservation lifecycle engine.
//!
//! Booking runs under a single engine-level lock plus one database
//! transaction: the conflict check, the code generation, the reservation
//! insert and the locker status change either all commit or all vanish,
//! and two tasks racing for the same window can never both pass the
//! check. Terminal transitions do not take the lock; they rely on the
//! status-guarded UPDATE to pick exactly one winner.

use crate::codes::AccessCodeGenerator;
use crate::config::EngineConfig;
use crate::conflict;
use chrono::{DateTime, Duration, Utc};
use hasp_core::constants::MAX_RESERVATION_DURATION_SECS;
use hasp_core::{Error, LockerStatus, ReservationStatus, Result};
use hasp_storage::models::Reservation;
use hasp_storage::repositories::{ReservationRepository, SqliteReservationRepository};
use hasp_storage::transaction;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Parameters for a new booking.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Locker to book.
    pub locker_id: i64,
    /// Booking owner.
    pub user_id: i64,
    /// Window start, inclusive (UTC).
    pub start_time: DateTime<Utc>,
    /// Window end, exclusive (UTC).
    pub end_time: DateTime<Utc>,
    /// Free-form notes from the booking form.
    pub notes: Option<String>,
}

/// Result of a terminal transition request.
///
/// `changed` is `false` when the reservation was already terminal and the
/// call was an idempotent no-op.
#[derive(Debug, Clone)]
pub struct Transition {
    /// The reservation after the call.
    pub reservation: Reservation,
    /// Whether this call performed the transition.
    pub changed: bool,
}

/// Reservation lifecycle engine.
pub struct ReservationEngine {
    pool: SqlitePool,
    reservations: SqliteReservationRepository,
    codes: AccessCodeGenerator,
    config: EngineConfig,
    /// Serializes the check-then-insert booking path.
    booking_lock: Mutex<()>,
}

impl ReservationEngine {
    /// Create a new engine over the given pool.
    ///
    /// # Errors
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(pool: SqlitePool, config: EngineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            reservations: SqliteReservationRepository::new(pool.clone()),
            pool,
            codes: AccessCodeGenerator::new(),
            config,
            booking_lock: Mutex::new(()),
        })
    }

    /// Create a reservation.
    ///
    /// Validates the window, checks the locker, rejects conflicts with
    /// active reservations, mints unique codes and marks the locker
    /// `reserved`, all atomically.
    ///
    /// # Errors
    /// - `Error::Validation` for an inverted window, a window longer than
    ///   the maximum duration, or a start outside the past tolerance
    /// - `Error::NotFound` if the locker does not exist
    /// - `Error::Unavailable` if the locker is under maintenance
    /// - `Error::Conflict` if the window overlaps an active reservation
    pub async fn create_reservation(&self, request: BookingRequest) -> Result<Reservation> {
        self.validate_window(request.start_time, request.end_time)?;

        // Lock spans check and insert; without it two bookings for the
        // same window could both observe a clear conflict report.
        let _guard = self.booking_lock.lock().await;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let locker = transaction::find_locker(&mut tx, request.locker_id)
            .await?
            .ok_or_else(|| Error::not_found("Locker", request.locker_id))?;

        if locker.in_maintenance() {
            return Err(Error::Unavailable {
                locker_id: locker.id,
                status: locker.status,
            });
        }

        let report = conflict::check_in_tx(
            &mut tx,
            request.locker_id,
            request.start_time,
            request.end_time,
        )
        .await?;
        if let Some(err) = report.into_error() {
            return Err(err);
        }

        let codes = self.codes.generate(&mut tx).await?;

        let reservation = Reservation {
            id: 0,
            locker_id: request.locker_id,
            user_id: request.user_id,
            start_time: request.start_time,
            end_time: request.end_time,
            status: ReservationStatus::Active.as_str().to_string(),
            reservation_code: codes.reservation_code,
            access_code: codes.access_code.as_str().to_string(),
            notes: request.notes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let id = transaction::create_reservation(&mut tx, &reservation).await?;
        transaction::update_locker_status(&mut tx, request.locker_id, LockerStatus::Reserved)
            .await?;

        tx.commit()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        info!(
            reservation_id = id,
            locker_id = request.locker_id,
            user_id = request.user_id,
            start = %request.start_time,
            end = %request.end_time,
            "reservation created"
        );

        self.reservations
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Reservation", id))
    }

    /// Cancel a reservation.
    ///
    /// Idempotent: cancelling an already-terminal reservation reports
    /// `changed: false` and leaves the stored status untouched.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the reservation does not exist.
    pub async fn cancel_reservation(&self, reservation_id: i64) -> Result<Transition> {
        self.finish(reservation_id, ReservationStatus::Cancelled)
            .await
    }

    /// Complete a reservation (item picked up).
    ///
    /// Idempotent like [`cancel_reservation`](Self::cancel_reservation).
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the reservation does not exist.
    pub async fn complete_reservation(&self, reservation_id: i64) -> Result<Transition> {
        self.finish(reservation_id, ReservationStatus::Completed)
            .await
    }

    /// Expire every active reservation whose end time has passed.
    ///
    /// Driven by the sweep task but callable directly with an explicit
    /// `now` for deterministic tests and catch-up after downtime. Rows
    /// that fail to transition are logged and skipped; one bad row never
    /// stops the sweep.
    ///
    /// Returns the number of reservations expired by this call.
    pub async fn evaluate_expirations(&self, now: DateTime<Utc>) -> Result<usize> {
        let overdue = self.reservations.find_expired_active(now).await?;
        let mut expired = 0;

        for reservation in overdue {
            match self.finish(reservation.id, ReservationStatus::Expired).await {
                Ok(transition) if transition.changed => expired += 1,
                // Lost a race against a cancel or complete; nothing to do
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        reservation_id = reservation.id,
                        error = %e,
                        "failed to expire reservation"
                    );
                }
            }
        }

        if expired > 0 {
            info!(count = expired, "expired overdue reservations");
        }

        Ok(expired)
    }

    /// Perform one terminal transition and release the locker if this was
    /// its last active reservation.
    async fn finish(&self, reservation_id: i64, status: ReservationStatus) -> Result<Transition> {
        // Resolve the locker before opening the transaction; pool reads
        // inside an open transaction would contend for its connection.
        let existing = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| Error::not_found("Reservation", reservation_id))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let changed =
            transaction::update_reservation_status_if_active(&mut tx, reservation_id, status)
                .await?;

        if changed {
            let remaining =
                transaction::count_active_for_locker(&mut tx, existing.locker_id).await?;
            if remaining == 0 {
                // Only release a reservation hold. Occupied and
                // maintenance are operator-owned states.
                let locker = transaction::find_locker(&mut tx, existing.locker_id).await?;
                if locker.is_some_and(|l| l.status == LockerStatus::Reserved.as_str()) {
                    transaction::update_locker_status(
                        &mut tx,
                        existing.locker_id,
                        LockerStatus::Available,
                    )
                    .await?;
                }
            }

            info!(
                reservation_id,
                status = %status,
                "reservation transitioned"
            );
        }

        tx.commit()
            .await
            .map_err(|e| Error::Storage(e.to_string()))?;

        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| Error::not_found("Reservation", reservation_id))?;

        Ok(Transition {
            reservation,
            changed,
        })
    }

    fn validate_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if start >= end {
            return Err(Error::validation(format!(
                "start_time must precede end_time ({start} >= {end})"
            )));
        }

        if end - start > Duration::seconds(MAX_RESERVATION_DURATION_SECS) {
            return Err(Error::validation(format!(
                "reservation exceeds maximum duration of {MAX_RESERVATION_DURATION_SECS} seconds"
            )));
        }

        let earliest = Utc::now() - Duration::seconds(self.config.start_tolerance_secs);
        if start < earliest {
            return Err(Error::validation(format!(
                "start_time {start} lies more than {} seconds in the past",
                self.config.start_tolerance_secs
            )));
        }

        Ok(())
    }
}
