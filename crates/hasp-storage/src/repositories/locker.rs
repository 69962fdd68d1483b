#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::Locker;
use hasp_core::LockerStatus;
use sqlx::SqlitePool;

/// Repository trait for Locker entity operations
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate.
pub trait LockerRepository: Send + Sync {
    /// Find a locker by its ID
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Locker>>;

    /// Get all lockers
    async fn find_all(&self) -> StorageResult<Vec<Locker>>;

    /// Find the locker occupying a hardware (address, number) pair
    async fn find_by_hardware_pair(
        &self,
        address: i64,
        number: i64,
    ) -> StorageResult<Option<Locker>>;

    /// Create a new locker
    async fn create(&self, locker: &Locker) -> StorageResult<i64>;

    /// Update an existing locker's hardware assignment and status
    async fn update(&self, locker: &Locker) -> StorageResult<()>;

    /// Update only the status column
    async fn update_status(&self, id: i64, status: LockerStatus) -> StorageResult<()>;
}

/// SQLite implementation of LockerRepository
pub struct SqliteLockerRepository {
    pool: SqlitePool,
}

impl SqliteLockerRepository {
    /// Create a new SQLite locker repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LockerRepository for SqliteLockerRepository {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<Locker>> {
        let locker = sqlx::query_as::<_, Locker>(
            r#"
            SELECT id, rs485_address, rs485_locker_number, status,
                   created_at, updated_at
            FROM lockers
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(locker)
    }

    async fn find_all(&self) -> StorageResult<Vec<Locker>> {
        let lockers = sqlx::query_as::<_, Locker>(
            r#"
            SELECT id, rs485_address, rs485_locker_number, status,
                   created_at, updated_at
            FROM lockers
            ORDER BY rs485_address, rs485_locker_number
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lockers)
    }

    async fn find_by_hardware_pair(
        &self,
        address: i64,
        number: i64,
    ) -> StorageResult<Option<Locker>> {
        let locker = sqlx::query_as::<_, Locker>(
            r#"
            SELECT id, rs485_address, rs485_locker_number, status,
                   created_at, updated_at
            FROM lockers
            WHERE rs485_address = ? AND rs485_locker_number = ?
            "#,
        )
        .bind(address)
        .bind(number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(locker)
    }

    async fn create(&self, locker: &Locker) -> StorageResult<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO lockers (rs485_address, rs485_locker_number, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(locker.rs485_address)
        .bind(locker.rs485_locker_number)
        .bind(&locker.status)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update(&self, locker: &Locker) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE lockers
            SET rs485_address = ?, rs485_locker_number = ?, status = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(locker.rs485_address)
        .bind(locker.rs485_locker_number)
        .bind(&locker.status)
        .bind(locker.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity_type: "Locker".to_string(),
                field: "id".to_string(),
                value: locker.id.to_string(),
            });
        }

        Ok(())
    }

    async fn update_status(&self, id: i64, status: LockerStatus) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE lockers
            SET status = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound {
                entity_type: "Locker".to_string(),
                field: "id".to_string(),
                value: id.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use chrono::Utc;

    async fn setup_test_db() -> Database {
        Database::in_memory().await.unwrap()
    }

    fn test_locker(address: i64, number: i64) -> Locker {
        Locker {
            id: 0,
            rs485_address: address,
            rs485_locker_number: number,
            status: "available".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_locker() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        let id = repo.create(&test_locker(2, 7)).await.unwrap();
        assert!(id > 0);

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.rs485_address, 2);
        assert_eq!(found.rs485_locker_number, 7);
        assert_eq!(found.status, "available");
    }

    #[tokio::test]
    async fn test_find_by_hardware_pair() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        repo.create(&test_locker(1, 3)).await.unwrap();

        let found = repo.find_by_hardware_pair(1, 3).await.unwrap();
        assert!(found.is_some());

        let missing = repo.find_by_hardware_pair(1, 4).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hardware_pair_rejected_by_store() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        repo.create(&test_locker(5, 10)).await.unwrap();
        let result = repo.create(&test_locker(5, 10)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_status() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        let id = repo.create(&test_locker(0, 1)).await.unwrap();
        repo.update_status(id, LockerStatus::Reserved).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.status, "reserved");
    }

    #[tokio::test]
    async fn test_update_missing_locker_is_not_found() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        let result = repo.update_status(999, LockerStatus::Available).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_hardware() {
        let db = setup_test_db().await;
        let repo = SqliteLockerRepository::new(db.pool().clone());

        repo.create(&test_locker(2, 1)).await.unwrap();
        repo.create(&test_locker(1, 5)).await.unwrap();
        repo.create(&test_locker(1, 2)).await.unwrap();

        let all = repo.find_all().await.unwrap();
        let pairs: Vec<(i64, i64)> = all
            .iter()
            .map(|l| (l.rs485_address, l.rs485_locker_number))
            .collect();
        assert_eq!(pairs, vec![(1, 2), (1, 5), (2, 1)]);
    }
}
