//! Locker controller: registry lookup to RS485 dispatch.
//!
//! Hardware failures are outcomes, not errors. A timed-out or refused
//! dispatch comes back as an [`OpenResult`] with `success: false` so the
//! caller can report it and retry; `Err` is reserved for requests that
//! were wrong before any byte went out (unknown locker, maintenance,
//! corrupted hardware coordinates).

use chrono::{DateTime, Utc};
use hasp_core::{Error, Result};
use hasp_hardware::SerialTransport;
use hasp_protocol::CommandFrame;
use hasp_storage::repositories::{LockerRepository, SqliteLockerRepository};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Outcome of one open command.
#[derive(Debug, Clone)]
pub struct OpenResult {
    /// Whether the controller acknowledged the open.
    pub success: bool,
    /// Human-readable outcome description.
    pub message: String,
    /// The frame that was dispatched.
    pub frame: CommandFrame,
    /// When the outcome was decided.
    pub timestamp: DateTime<Utc>,
}

impl OpenResult {
    fn opened(frame: CommandFrame, acked_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            message: "locker opened".to_string(),
            frame,
            timestamp: acked_at,
        }
    }

    fn failed(frame: CommandFrame, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            frame,
            timestamp: Utc::now(),
        }
    }
}

/// Dispatches open commands to locker controller boards.
///
/// Sends targeting the same board address are serialized through a
/// per-address lock; the boards drop frames that interleave on the bus.
/// The transport itself is also locked per send, since a single serial
/// line carries the whole bus.
pub struct LockerController<T: SerialTransport> {
    lockers: SqliteLockerRepository,
    transport: Mutex<T>,
    address_locks: std::sync::Mutex<HashMap<u8, Arc<Mutex<()>>>>,
    dispatch_timeout: Duration,
}

impl<T: SerialTransport> LockerController<T> {
    /// Create a new controller over the given pool and transport.
    pub fn new(pool: SqlitePool, transport: T, dispatch_timeout: Duration) -> Self {
        Self {
            lockers: SqliteLockerRepository::new(pool),
            transport: Mutex::new(transport),
            address_locks: std::sync::Mutex::new(HashMap::new()),
            dispatch_timeout,
        }
    }

    /// Open a locker by its registry ID.
    ///
    /// # Errors
    /// - `Error::NotFound` if the locker is not registered
    /// - `Error::Unavailable` if the locker is under maintenance
    /// - `Error::Validation` if the stored hardware coordinates are
    ///   corrupt
    ///
    /// Dispatch failures (timeout, NACK, disconnect) return
    /// `Ok(OpenResult { success: false, .. })`.
    pub async fn open_locker(&self, locker_id: i64) -> Result<OpenResult> {
        let locker = self
            .lockers
            .find_by_id(locker_id)
            .await?
            .ok_or_else(|| Error::not_found("Locker", locker_id))?;

        if locker.in_maintenance() {
            return Err(Error::Unavailable {
                locker_id: locker.id,
                status: locker.status,
            });
        }

        let address = locker.address()?;
        let number = locker.number()?;
        let frame = CommandFrame::open(address, number);

        debug!(locker_id, %address, %number, frame = %frame, "dispatching open command");

        let address_lock = self.address_lock(address.as_u8());
        let _address_guard = address_lock.lock().await;

        let outcome = {
            let mut transport = self.transport.lock().await;
            timeout(self.dispatch_timeout, transport.send(&frame)).await
        };

        let result = match outcome {
            Ok(Ok(ack)) => OpenResult::opened(frame, ack.acked_at),
            Ok(Err(e)) => {
                warn!(locker_id, %address, error = %e, "open command failed");
                OpenResult::failed(frame, e.to_string())
            }
            Err(_) => {
                warn!(
                    locker_id,
                    %address,
                    timeout_ms = self.dispatch_timeout.as_millis() as u64,
                    "open command timed out"
                );
                OpenResult::failed(
                    frame,
                    format!(
                        "no acknowledgment within {} ms",
                        self.dispatch_timeout.as_millis()
                    ),
                )
            }
        };

        Ok(result)
    }

    /// Whether the underlying transport currently has a connection.
    pub async fn is_connected(&self) -> bool {
        self.transport.lock().await.is_connected().await
    }

    fn address_lock(&self, address: u8) -> Arc<Mutex<()>> {
        let mut locks = self
            .address_locks
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(address).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hasp_hardware::mock::{MockOutcome, MockTransport, MockTransportHandle};
    use hasp_storage::Database;

    async fn setup(status: &str) -> (Database, i64) {
        let db = Database::in_memory().await.unwrap();
        let id = sqlx::query(
            "INSERT INTO lockers (rs485_address, rs485_locker_number, status) VALUES (2, 7, ?)",
        )
        .bind(status)
        .execute(db.pool())
        .await
        .unwrap()
        .last_insert_rowid();
        (db, id)
    }

    fn controller(
        db: &Database,
        timeout: Duration,
    ) -> (LockerController<MockTransport>, MockTransportHandle) {
        let (transport, handle) = MockTransport::new();
        (
            LockerController::new(db.pool().clone(), transport, timeout),
            handle,
        )
    }

    #[tokio::test]
    async fn test_open_dispatches_expected_frame() {
        let (db, locker_id) = setup("reserved").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));

        let result = controller.open_locker(locker_id).await.unwrap();
        assert!(result.success);

        // Address 2, compartment 7: checksum XORs to zero
        let sent = handle.sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].as_bytes(),
            &[0x5A, 0x5A, 0x00, 0x02, 0x00, 0x04, 0x00, 0x01, 0x07, 0x00]
        );
    }

    #[tokio::test]
    async fn test_unknown_locker_is_not_found() {
        let (db, _) = setup("available").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));

        let err = controller.open_locker(999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(handle.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_maintenance_refuses_before_dispatch() {
        let (db, locker_id) = setup("maintenance").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));

        let err = controller.open_locker(locker_id).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable { .. }));
        assert_eq!(handle.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_nack_is_reported_not_raised() {
        let (db, locker_id) = setup("reserved").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));
        handle.script(MockOutcome::Nack(0x15));

        let result = controller.open_locker(locker_id).await.unwrap();
        assert!(!result.success);
        assert!(result.message.contains("0x15"));
    }

    // Real time: paused-clock auto-advance trips the sqlx pool's acquire
    // timeout before the sqlite worker thread can answer.
    #[tokio::test]
    async fn test_hang_hits_dispatch_timeout() {
        let (db, locker_id) = setup("reserved").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));
        handle.script(MockOutcome::Hang);

        let result = controller.open_locker(locker_id).await.unwrap();
        assert!(!result.success);
        assert!(result.message.contains("3000 ms"));
    }

    #[tokio::test]
    async fn test_disconnect_is_reported_not_raised() {
        let (db, locker_id) = setup("reserved").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));
        handle.set_connected(false);

        let result = controller.open_locker(locker_id).await.unwrap();
        assert!(!result.success);
        assert!(!controller.is_connected().await);
    }

    #[tokio::test]
    async fn test_sends_to_same_address_are_serialized() {
        let (db, locker_id) = setup("reserved").await;
        let (controller, handle) = controller(&db, Duration::from_secs(3));
        let controller = std::sync::Arc::new(controller);

        let a = Arc::clone(&controller);
        let b = Arc::clone(&controller);
        let (ra, rb) = tokio::join!(a.open_locker(locker_id), b.open_locker(locker_id));

        assert!(ra.unwrap().success);
        assert!(rb.unwrap().success);
        assert_eq!(handle.sent_count(), 2);
    }
}
