//! Locker registry: hardware assignment and status management.
//!
//! The registry is the only write path for locker rows outside the
//! booking and lifecycle transactions. It validates hardware coordinates
//! through the `hasp-core` newtypes and rejects duplicate
//! `(address, number)` pairs before the database unique index ever fires,
//! so callers see a validation error instead of a constraint failure.

use hasp_core::{Error, LockerNumber, LockerStatus, Result, Rs485Address};
use hasp_storage::models::Locker;
use hasp_storage::repositories::{LockerRepository, SqliteLockerRepository};
use sqlx::SqlitePool;
use tracing::info;

/// Registry of physical lockers and their bus coordinates.
pub struct LockerRegistry {
    lockers: SqliteLockerRepository,
}

impl LockerRegistry {
    /// Create a new registry over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            lockers: SqliteLockerRepository::new(pool),
        }
    }

    /// Register a new locker at the given bus coordinates.
    ///
    /// New lockers start `available`.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the address or number is out of
    /// range, or if another locker already claims the pair.
    pub async fn register(&self, address: u8, number: u8) -> Result<Locker> {
        let address = Rs485Address::new(address)?;
        let number = LockerNumber::new(number)?;

        self.ensure_pair_free(address, number, None).await?;

        let locker = Locker {
            id: 0,
            rs485_address: i64::from(address.as_u8()),
            rs485_locker_number: i64::from(number.as_u8()),
            status: LockerStatus::Available.as_str().to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let id = self.lockers.create(&locker).await?;
        info!(locker_id = id, %address, %number, "registered locker");

        self.config(id).await
    }

    /// Move a locker to new bus coordinates.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the locker does not exist,
    /// `Error::Validation` on range or duplicate-pair violations.
    pub async fn update_hardware(&self, locker_id: i64, address: u8, number: u8) -> Result<Locker> {
        let address = Rs485Address::new(address)?;
        let number = LockerNumber::new(number)?;

        let mut locker = self.config(locker_id).await?;

        self.ensure_pair_free(address, number, Some(locker_id)).await?;

        locker.rs485_address = i64::from(address.as_u8());
        locker.rs485_locker_number = i64::from(number.as_u8());
        self.lockers.update(&locker).await?;
        info!(locker_id, %address, %number, "updated locker hardware assignment");

        self.config(locker_id).await
    }

    /// Set a locker's operational status.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the locker does not exist.
    pub async fn set_status(&self, locker_id: i64, status: LockerStatus) -> Result<()> {
        self.lockers.update_status(locker_id, status).await?;
        info!(locker_id, status = %status, "locker status changed");
        Ok(())
    }

    /// Fetch one locker's configuration.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the locker does not exist.
    pub async fn config(&self, locker_id: i64) -> Result<Locker> {
        self.lockers
            .find_by_id(locker_id)
            .await?
            .ok_or_else(|| Error::not_found("Locker", locker_id))
    }

    /// All registered lockers, ordered by bus coordinates.
    pub async fn list(&self) -> Result<Vec<Locker>> {
        Ok(self.lockers.find_all().await?)
    }

    async fn ensure_pair_free(
        &self,
        address: Rs485Address,
        number: LockerNumber,
        exclude: Option<i64>,
    ) -> Result<()> {
        let existing = self
            .lockers
            .find_by_hardware_pair(i64::from(address.as_u8()), i64::from(number.as_u8()))
            .await?;

        if let Some(existing) = existing
            && Some(existing.id) != exclude
        {
            return Err(Error::validation(format!(
                "hardware pair {address}:{number} already assigned to locker {}",
                existing.id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hasp_storage::Database;
    use rstest::rstest;

    async fn setup() -> (Database, LockerRegistry) {
        let db = Database::in_memory().await.unwrap();
        let registry = LockerRegistry::new(db.pool().clone());
        (db, registry)
    }

    #[tokio::test]
    async fn test_register_and_fetch() {
        let (_db, registry) = setup().await;

        let locker = registry.register(2, 7).await.unwrap();
        assert_eq!(locker.rs485_address, 2);
        assert_eq!(locker.rs485_locker_number, 7);
        assert_eq!(locker.status, "available");

        let fetched = registry.config(locker.id).await.unwrap();
        assert_eq!(fetched.id, locker.id);
    }

    #[rstest]
    #[case(32, 1)]
    #[case(255, 1)]
    #[case(0, 0)]
    #[case(0, 25)]
    #[tokio::test]
    async fn test_register_rejects_out_of_range(#[case] address: u8, #[case] number: u8) {
        let (_db, registry) = setup().await;
        let err = registry.register(address, number).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[rstest]
    #[case(0, 1)]
    #[case(31, 24)]
    #[tokio::test]
    async fn test_register_accepts_boundaries(#[case] address: u8, #[case] number: u8) {
        let (_db, registry) = setup().await;
        assert!(registry.register(address, number).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let (_db, registry) = setup().await;
        registry.register(5, 10).await.unwrap();

        let err = registry.register(5, 10).await.unwrap_err();
        assert!(err.is_validation());

        // Same address, different compartment is fine
        assert!(registry.register(5, 11).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_hardware_keeps_own_pair() {
        let (_db, registry) = setup().await;
        let locker = registry.register(1, 2).await.unwrap();

        // Re-assert the same pair; must not be reported as a duplicate
        let updated = registry.update_hardware(locker.id, 1, 2).await.unwrap();
        assert_eq!(updated.rs485_address, 1);

        // Move to a free pair
        let moved = registry.update_hardware(locker.id, 3, 4).await.unwrap();
        assert_eq!(moved.rs485_address, 3);
        assert_eq!(moved.rs485_locker_number, 4);
    }

    #[tokio::test]
    async fn test_update_hardware_rejects_taken_pair() {
        let (_db, registry) = setup().await;
        registry.register(1, 2).await.unwrap();
        let other = registry.register(3, 4).await.unwrap();

        let err = registry.update_hardware(other.id, 1, 2).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_missing_locker_is_not_found() {
        let (_db, registry) = setup().await;

        let err = registry.config(99).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let err = registry.update_hardware(99, 1, 1).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_status() {
        let (_db, registry) = setup().await;
        let locker = registry.register(0, 1).await.unwrap();

        registry
            .set_status(locker.id, LockerStatus::Maintenance)
            .await
            .unwrap();
        let fetched = registry.config(locker.id).await.unwrap();
        assert_eq!(fetched.status, "maintenance");
        assert!(fetched.in_maintenance());
    }

    #[tokio::test]
    async fn test_list_orders_by_coordinates() {
        let (_db, registry) = setup().await;
        registry.register(2, 1).await.unwrap();
        registry.register(1, 3).await.unwrap();
        registry.register(1, 1).await.unwrap();

        let all = registry.list().await.unwrap();
        let pairs: Vec<(i64, i64)> = all
            .iter()
            .map(|l| (l.rs485_address, l.rs485_locker_number))
            .collect();
        assert_eq!(pairs, vec![(1, 1), (1, 3), (2, 1)]);
    }
}
