#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::Reservation;
use chrono::{DateTime, Utc};
use hasp_core::ReservationStatus;
use sqlx::SqlitePool;

/// Repository trait for Reservation entity operations
///
/// Status writes go through [`update_status_if_active`]: the UPDATE is
/// guarded on `status = 'active'` so that two concurrent terminal
/// transitions cannot both take effect. The loser (or a repeated call on
/// an already-terminal reservation) observes zero affected rows and is
/// reported as an idempotent no-op rather than an error.
///
/// [`update_status_if_active`]: ReservationRepository::update_status_if_active
pub trait ReservationRepository: Send + Sync {
    /// Find a reservation by its ID
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Reservation>>;

    /// Create a new reservation, returning its ID
    async fn create(&self, reservation: &Reservation) -> StorageResult<i64>;

    /// Move an active reservation to `status`; returns `false` if the
    /// reservation was already terminal (no row changed)
    async fn update_status_if_active(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> StorageResult<bool>;

    /// All active reservations for a locker, earliest window first
    async fn find_active_for_locker(&self, locker_id: i64) -> StorageResult<Vec<Reservation>>;

    /// Active reservations on `locker_id` whose window overlaps
    /// `[start, end)`, optionally excluding one reservation ID
    async fn find_active_overlapping(
        &self,
        locker_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i64>,
    ) -> StorageResult<Vec<Reservation>>;

    /// Active reservations whose end time has passed at `now`
    async fn find_expired_active(&self, now: DateTime<Utc>) -> StorageResult<Vec<Reservation>>;

    /// Whether any active reservation already carries this access code
    async fn active_code_exists(&self, access_code: &str) -> StorageResult<bool>;

    /// Number of active reservations held against a locker
    async fn count_active_for_locker(&self, locker_id: i64) -> StorageResult<i64>;
}

/// SQLite implementation of ReservationRepository
pub struct SqliteReservationRepository {
    pool: SqlitePool,
}

impl SqliteReservationRepository {
    /// Create a new SQLite reservation repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const RESERVATION_COLUMNS: &str = "id, locker_id, user_id, start_time, end_time, status, \
     reservation_code, access_code, notes, created_at, updated_at";

impl ReservationRepository for SqliteReservationRepository {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }

    async fn create(&self, reservation: &Reservation) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO reservations (
                locker_id, user_id, start_time, end_time, status,
                reservation_code, access_code, notes
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.locker_id)
        .bind(reservation.user_id)
        .bind(reservation.start_time)
        .bind(reservation.end_time)
        .bind(&reservation.status)
        .bind(&reservation.reservation_code)
        .bind(&reservation.access_code)
        .bind(&reservation.notes)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_status_if_active(
        &self,
        id: i64,
        status: ReservationStatus,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ? AND status = 'active'
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_active_for_locker(&self, locker_id: i64) -> StorageResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE locker_id = ? AND status = 'active' \
             ORDER BY start_time"
        ))
        .bind(locker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    async fn find_active_overlapping(
        &self,
        locker_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<i64>,
    ) -> StorageResult<Vec<Reservation>> {
        // Half-open overlap: existing.start < end AND start < existing.end.
        // Touching boundaries fall outside both comparisons.
        let reservations = match exclude {
            Some(excluded_id) => {
                sqlx::query_as::<_, Reservation>(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations \
                     WHERE locker_id = ? AND status = 'active' \
                       AND start_time < ? AND ? < end_time \
                       AND id != ? \
                     ORDER BY start_time"
                ))
                .bind(locker_id)
                .bind(end)
                .bind(start)
                .bind(excluded_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Reservation>(&format!(
                    "SELECT {RESERVATION_COLUMNS} FROM reservations \
                     WHERE locker_id = ? AND status = 'active' \
                       AND start_time < ? AND ? < end_time \
                     ORDER BY start_time"
                ))
                .bind(locker_id)
                .bind(end)
                .bind(start)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(reservations)
    }

    async fn find_expired_active(&self, now: DateTime<Utc>) -> StorageResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE status = 'active' AND end_time <= ? \
             ORDER BY end_time"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    async fn active_code_exists(&self, access_code: &str) -> StorageResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE access_code = ? AND status = 'active'",
        )
        .bind(access_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn count_active_for_locker(&self, locker_id: i64) -> StorageResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE locker_id = ? AND status = 'active'",
        )
        .bind(locker_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
