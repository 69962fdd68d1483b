//! Repository traits and their SQLite implementations.

pub mod locker;
pub mod reservation;

pub use locker::{LockerRepository, SqliteLockerRepository};
pub use reservation::{ReservationRepository, SqliteReservationRepository};
