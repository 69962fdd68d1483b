//! Database entity models.

mod locker;
mod reservation;

pub use locker::Locker;
pub use reservation::Reservation;
