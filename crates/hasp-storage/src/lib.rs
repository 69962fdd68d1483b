//! Storage layer for the Hasp locker management system.
//!
//! This crate provides SQLite-backed persistence for lockers and
//! reservations, plus transaction-aware operations the booking path uses
//! to keep its conflict check, reservation insert and locker status
//! change atomic.
//!
//! # Architecture
//!
//! The storage layer uses a repository pattern with the following components:
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`LockerRepository`], [`ReservationRepository`] - Data access traits
//! - [`transaction`] - Transaction-aware operations for atomic multi-step operations
//!
//! # Core Concepts
//!
//! ## Half-Open Reservation Windows
//!
//! Reservation windows are half-open `[start_time, end_time)` intervals
//! stored as RFC 3339 UTC text. The overlap query is the strict form
//! `existing.start < end AND start < existing.end`, so back-to-back
//! bookings that merely touch at a boundary never conflict.
//!
//! ## Status-Guarded Transitions
//!
//! Reservation rows are never deleted. Terminal transitions go through a
//! guarded UPDATE (`WHERE status = 'active'`); a zero-row result means the
//! reservation was already terminal and the caller treats the call as an
//! idempotent no-op. Two tasks racing to cancel and complete the same
//! reservation therefore produce exactly one terminal state.
//!
//! # Examples
//!
//! ## Basic Setup
//!
//! ```no_run
//! use hasp_storage::{Database, DatabaseConfig};
//! use hasp_storage::repositories::{LockerRepository, SqliteLockerRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig::new("hasp.db")
//!     .max_connections(10)
//!     .auto_migrate(true);
//!
//! let db = Database::new(config).await?;
//!
//! let lockers = SqliteLockerRepository::new(db.pool().clone());
//! for locker in lockers.find_all().await? {
//!     println!("locker {} at {}:{}", locker.id, locker.rs485_address, locker.rs485_locker_number);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Transactional Booking Steps
//!
//! ```no_run
//! use hasp_storage::{Database, DatabaseConfig, transaction};
//! use hasp_storage::models::Reservation;
//! use hasp_core::LockerStatus;
//! use chrono::{Duration, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("hasp.db")).await?;
//!
//! let start = Utc::now() + Duration::hours(1);
//! let end = start + Duration::hours(2);
//!
//! let mut tx = db.pool().begin().await?;
//!
//! let conflicts = transaction::find_active_overlapping(&mut tx, 1, start, end).await?;
//! if conflicts.is_empty() {
//!     let reservation = Reservation {
//!         id: 0,
//!         locker_id: 1,
//!         user_id: 42,
//!         start_time: start,
//!         end_time: end,
//!         status: "active".to_string(),
//!         reservation_code: "RSV7KQ3M".to_string(),
//!         access_code: "7KQ3M9XW".to_string(),
//!         notes: None,
//!         created_at: Utc::now(),
//!         updated_at: Utc::now(),
//!     };
//!     transaction::create_reservation(&mut tx, &reservation).await?;
//!     transaction::update_locker_status(&mut tx, 1, LockerStatus::Reserved).await?;
//! }
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! All queries use parameterized statements via SQLx, and the migration
//! path is resolved at compile time by the `sqlx::migrate!` macro.
//!
//! # Performance
//!
//! - Connection pooling with configurable limits (default: 10 max, 2 min)
//! - WAL mode for better concurrent read/write performance
//! - Indexes on `(locker_id, status)` and `(status, end_time)` back the
//!   conflict query and the expiration sweep

pub mod connection;
pub mod error;
pub mod models;
pub mod repositories;
pub mod transaction;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::{Locker, Reservation};
pub use repositories::{
    LockerRepository, ReservationRepository, SqliteLockerRepository, SqliteReservationRepository,
};
