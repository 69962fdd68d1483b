//! Reservation and locker-access engine for the Hasp locker system.
//!
//! This crate ties the storage, protocol and hardware layers together:
//!
//! - [`ReservationEngine`] - booking creation and terminal transitions,
//!   race-free under concurrent requests
//! - [`ConflictChecker`] - half-open window overlap detection
//! - [`AccessCodeGenerator`] - unique code minting inside the booking
//!   transaction
//! - [`LockerRegistry`] - hardware assignment and status management
//! - [`LockerController`] - registry lookup to RS485 frame dispatch
//! - [`ExpirationSweeper`] - periodic expiration of overdue reservations
//!
//! # Example
//!
//! ```no_run
//! use hasp_engine::{BookingRequest, EngineConfig, LockerRegistry, ReservationEngine};
//! use hasp_storage::{Database, DatabaseConfig};
//! use chrono::{Duration, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("hasp.db")).await?;
//!
//! let registry = LockerRegistry::new(db.pool().clone());
//! let locker = registry.register(2, 7).await?;
//!
//! let engine = ReservationEngine::new(db.pool().clone(), EngineConfig::default())?;
//! let start = Utc::now() + Duration::hours(1);
//! let reservation = engine
//!     .create_reservation(BookingRequest {
//!         locker_id: locker.id,
//!         user_id: 42,
//!         start_time: start,
//!         end_time: start + Duration::hours(2),
//!         notes: None,
//!     })
//!     .await?;
//!
//! println!("booked: {}", reservation.reservation_code);
//! # Ok(())
//! # }
//! ```

pub mod codes;
pub mod config;
pub mod conflict;
pub mod controller;
pub mod lifecycle;
pub mod registry;
pub mod sweep;

pub use codes::{AccessCodeGenerator, GeneratedCodes};
pub use config::EngineConfig;
pub use conflict::{ConflictChecker, ConflictReport};
pub use controller::{LockerController, OpenResult};
pub use lifecycle::{BookingRequest, ReservationEngine, Transition};
pub use registry::LockerRegistry;
pub use sweep::ExpirationSweeper;
