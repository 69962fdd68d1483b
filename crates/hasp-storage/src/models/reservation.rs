use chrono::{DateTime, Utc};
use hasp_core::{ReservationStatus, Result};
use serde::{Deserialize, Serialize};

/// Reservation entity: one booking of a locker over a time window
///
/// Time windows are half-open `[start_time, end_time)` UTC intervals:
/// two active reservations on the same locker may touch at a boundary
/// (`a.end_time == b.start_time`) without conflicting, which permits
/// back-to-back bookings.
///
/// Terminal reservations (`cancelled`, `completed`, `expired`) are never
/// deleted; they remain as audit history and stop participating in
/// conflict checks and code-uniqueness lookups.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    /// Auto-increment primary key
    pub id: i64,

    /// Booked locker (FK to lockers)
    pub locker_id: i64,

    /// Booking owner (managed by the out-of-scope user layer)
    pub user_id: i64,

    /// Window start, inclusive (UTC)
    pub start_time: DateTime<Utc>,

    /// Window end, exclusive (UTC)
    pub end_time: DateTime<Utc>,

    /// Lifecycle status (`active`, `cancelled`, `completed`, `expired`)
    pub status: String,

    /// Booking identifier shown to the user
    pub reservation_code: String,

    /// Pickup code presented at the locker
    pub access_code: String,

    /// Free-form notes from the booking form
    pub notes: Option<String>,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Record last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Parse the stored status column.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the column holds an unknown value.
    pub fn reservation_status(&self) -> Result<ReservationStatus> {
        ReservationStatus::parse(&self.status)
    }

    /// Returns `true` if the reservation is still live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active.as_str()
    }

    /// Returns `true` if this window overlaps `[start, end)`.
    ///
    /// Half-open semantics: boundaries that merely touch do not overlap.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// Returns `true` if the window has fully elapsed at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_time
    }

    /// Booking duration.
    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn sample(start_h: u32, end_h: u32) -> Reservation {
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();
        Reservation {
            id: 1,
            locker_id: 1,
            user_id: 7,
            start_time: day + Duration::hours(start_h as i64),
            end_time: day + Duration::hours(end_h as i64),
            status: "active".to_string(),
            reservation_code: "RSV10AB2".to_string(),
            access_code: "7KQ3M9XW".to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    // Existing booking holds 10:00-11:00
    #[rstest]
    #[case(10, 11, true)] // identical window
    #[case(9, 12, true)] // containment
    #[case(9, 10, false)] // touches at existing start
    #[case(11, 12, false)] // touches at existing end
    #[case(8, 9, false)] // strictly before
    #[case(12, 13, false)] // strictly after
    fn test_overlap_half_open_semantics(
        #[case] start_h: u32,
        #[case] end_h: u32,
        #[case] expected: bool,
    ) {
        let existing = sample(10, 11);
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();

        let start = day + Duration::hours(start_h as i64);
        let end = day + Duration::hours(end_h as i64);
        assert_eq!(existing.overlaps(start, end), expected);
    }

    #[test]
    fn test_half_hour_shift_overlaps() {
        let existing = sample(10, 11);
        let day = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();

        assert!(existing.overlaps(
            day + Duration::minutes(10 * 60 + 30),
            day + Duration::minutes(11 * 60 + 30)
        ));
    }

    #[test]
    fn test_overdue() {
        let r = sample(10, 11);
        assert!(!r.is_overdue(r.end_time - Duration::seconds(1)));
        // End instant itself is excluded from the window
        assert!(r.is_overdue(r.end_time));
        assert!(r.is_overdue(r.end_time + Duration::hours(1)));
    }

    #[test]
    fn test_status_helpers() {
        let mut r = sample(10, 11);
        assert!(r.is_active());
        assert_eq!(
            r.reservation_status().unwrap(),
            ReservationStatus::Active
        );

        r.status = "expired".to_string();
        assert!(!r.is_active());
        assert!(r.reservation_status().unwrap().is_terminal());
    }

    #[test]
    fn test_duration() {
        let r = sample(10, 12);
        assert_eq!(r.duration(), Duration::hours(2));
    }
}
