//! Access and reservation code generation.
//!
//! Codes are drawn uniformly from the 36-symbol alphanumeric alphabet.
//! Uniqueness is scoped to ACTIVE reservations only: once a reservation
//! reaches a terminal state its codes return to the pool. Generation runs
//! inside the caller's booking transaction so the uniqueness check and the
//! insert that relies on it cannot be split by a concurrent booking.

use hasp_core::constants::{ACCESS_CODE_ALPHABET, ACCESS_CODE_LENGTH, MAX_CODE_ATTEMPTS};
use hasp_core::{AccessCode, Error, Result};
use hasp_storage::transaction;
use rand::Rng;
use sqlx::{Sqlite, Transaction};

/// Prefix on user-facing reservation codes.
const RESERVATION_CODE_PREFIX: &str = "RSV";

/// Codes minted for one new reservation.
#[derive(Debug, Clone)]
pub struct GeneratedCodes {
    /// Booking identifier shown to the user.
    pub reservation_code: String,
    /// Pickup code presented at the locker.
    pub access_code: AccessCode,
}

/// Random code generator with store-backed uniqueness.
#[derive(Debug, Clone, Default)]
pub struct AccessCodeGenerator;

impl AccessCodeGenerator {
    /// Create a new generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// One random candidate, 8 chars over `[0-9A-Z]`.
    fn candidate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..ACCESS_CODE_LENGTH)
            .map(|_| {
                let idx = rng.gen_range(0..ACCESS_CODE_ALPHABET.len());
                ACCESS_CODE_ALPHABET[idx] as char
            })
            .collect()
    }

    /// Mint a unique pair of codes inside the booking transaction.
    ///
    /// Regenerates on collision with any active reservation, up to the
    /// retry bound. The bound exists to convert a broken randomness source
    /// or store fault into an error instead of a spin.
    ///
    /// # Errors
    /// Returns `Error::CodeGeneration` if every attempt collided, or a
    /// storage error if the uniqueness lookups fail.
    pub async fn generate(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<GeneratedCodes> {
        let access_code = self.unique_access_code(tx).await?;
        let reservation_code = self.unique_reservation_code(tx).await?;

        Ok(GeneratedCodes {
            reservation_code,
            access_code,
        })
    }

    async fn unique_access_code(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<AccessCode> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = self.candidate();
            if !transaction::active_code_exists(tx, &candidate).await? {
                return AccessCode::new(&candidate);
            }
        }

        Err(Error::CodeGeneration {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    async fn unique_reservation_code(&self, tx: &mut Transaction<'_, Sqlite>) -> Result<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = format!("{RESERVATION_CODE_PREFIX}{}", self.candidate());
            if !active_reservation_code_exists(tx, &candidate).await? {
                return Ok(candidate);
            }
        }

        Err(Error::CodeGeneration {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }
}

async fn active_reservation_code_exists(
    tx: &mut Transaction<'_, Sqlite>,
    reservation_code: &str,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM reservations WHERE reservation_code = ? AND status = 'active'",
    )
    .bind(reservation_code)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| Error::Storage(e.to_string()))?;

    Ok(count > 0)
}
