//! Transaction-aware query functions.
//!
//! The booking path must run its conflict check, the reservation insert
//! and the locker status change inside one transaction so a crash between
//! steps cannot leave a reserved locker without a reservation (or the
//! reverse). These free functions take a `&mut Transaction` instead of a
//! pool, letting the engine compose them under a single commit.

use crate::error::StorageResult;
use crate::models::{Locker, Reservation};
use chrono::{DateTime, Utc};
use hasp_core::{LockerStatus, ReservationStatus};
use sqlx::{Sqlite, Transaction};

const RESERVATION_COLUMNS: &str = "id, locker_id, user_id, start_time, end_time, status, \
     reservation_code, access_code, notes, created_at, updated_at";

/// Fetch a locker row inside the transaction.
pub async fn find_locker(
    tx: &mut Transaction<'_, Sqlite>,
    locker_id: i64,
) -> StorageResult<Option<Locker>> {
    let locker = sqlx::query_as::<_, Locker>(
        r#"
        SELECT id, rs485_address, rs485_locker_number, status,
               created_at, updated_at
        FROM lockers
        WHERE id = ?
        "#,
    )
    .bind(locker_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(locker)
}

/// Active reservations on `locker_id` overlapping `[start, end)`.
pub async fn find_active_overlapping(
    tx: &mut Transaction<'_, Sqlite>,
    locker_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> StorageResult<Vec<Reservation>> {
    let reservations = sqlx::query_as::<_, Reservation>(&format!(
        "SELECT {RESERVATION_COLUMNS} FROM reservations \
         WHERE locker_id = ? AND status = 'active' \
           AND start_time < ? AND ? < end_time \
         ORDER BY start_time"
    ))
    .bind(locker_id)
    .bind(end)
    .bind(start)
    .fetch_all(&mut **tx)
    .await?;

    Ok(reservations)
}

/// Insert a reservation row, returning its ID.
pub async fn create_reservation(
    tx: &mut Transaction<'_, Sqlite>,
    reservation: &Reservation,
) -> StorageResult<i64> {
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
    .execute(&mut **tx)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Status-guarded terminal transition inside the transaction.
///
/// Returns `false` when the reservation was already terminal, which the
/// engine reports as an idempotent no-op.
pub async fn update_reservation_status_if_active(
    tx: &mut Transaction<'_, Sqlite>,
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
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set a locker's status inside the transaction.
pub async fn update_locker_status(
    tx: &mut Transaction<'_, Sqlite>,
    locker_id: i64,
    status: LockerStatus,
) -> StorageResult<()> {
    sqlx::query(
        r#"
        UPDATE lockers
        SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(locker_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Number of active reservations held against a locker.
pub async fn count_active_for_locker(
    tx: &mut Transaction<'_, Sqlite>,
    locker_id: i64,
) -> StorageResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservations WHERE locker_id = ? AND status = 'active'",
    )
    .bind(locker_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count)
}

/// Whether any active reservation already carries this access code.
pub async fn active_code_exists(
    tx: &mut Transaction<'_, Sqlite>,
    access_code: &str,
) -> StorageResult<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservations WHERE access_code = ? AND status = 'active'",
    )
    .bind(access_code)
    .fetch_one(&mut **tx)
    .await?;

    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use chrono::{Duration, TimeZone};

    async fn setup() -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let result = sqlx::query(
            "INSERT INTO lockers (rs485_address, rs485_locker_number, status) VALUES (2, 7, 'available')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        (db, result.last_insert_rowid())
    }

    fn sample(locker_id: i64) -> Reservation {
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        Reservation {
            id: 0,
            locker_id,
            user_id: 42,
            start_time: day + Duration::hours(10),
            end_time: day + Duration::hours(11),
            status: "active".to_string(),
            reservation_code: "RSVAAAA1".to_string(),
            access_code: "AAAA1111".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_booking_steps_commit_atomically() {
        let (db, locker_id) = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        let overlapping = find_active_overlapping(
            &mut tx,
            locker_id,
            sample(locker_id).start_time,
            sample(locker_id).end_time,
        )
        .await
        .unwrap();
        assert!(overlapping.is_empty());

        let id = create_reservation(&mut tx, &sample(locker_id)).await.unwrap();
        update_locker_status(&mut tx, locker_id, LockerStatus::Reserved)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(id > 0);
        let status: String = sqlx::query_scalar("SELECT status FROM lockers WHERE id = ?")
            .bind(locker_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(status, "reserved");
    }

    #[tokio::test]
    async fn test_rollback_discards_reservation_and_locker_change() {
        let (db, locker_id) = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        create_reservation(&mut tx, &sample(locker_id)).await.unwrap();
        update_locker_status(&mut tx, locker_id, LockerStatus::Reserved)
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);

        let status: String = sqlx::query_scalar("SELECT status FROM lockers WHERE id = ?")
            .bind(locker_id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(status, "available");
    }

    #[tokio::test]
    async fn test_guarded_transition_in_transaction() {
        let (db, locker_id) = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        let id = create_reservation(&mut tx, &sample(locker_id)).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = db.pool().begin().await.unwrap();
        assert!(
            update_reservation_status_if_active(&mut tx, id, ReservationStatus::Completed)
                .await
                .unwrap()
        );
        assert_eq!(count_active_for_locker(&mut tx, locker_id).await.unwrap(), 0);
        assert!(
            !update_reservation_status_if_active(&mut tx, id, ReservationStatus::Cancelled)
                .await
                .unwrap()
        );
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_active_code_lookup_in_transaction() {
        let (db, locker_id) = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        assert!(!active_code_exists(&mut tx, "AAAA1111").await.unwrap());
        create_reservation(&mut tx, &sample(locker_id)).await.unwrap();
        assert!(active_code_exists(&mut tx, "AAAA1111").await.unwrap());
        tx.commit().await.unwrap();
    }
}
