use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Booking conflicts
    #[error("Booking conflict on locker {locker_id}: overlaps reservations {conflicting:?}")]
    Conflict {
        locker_id: i64,
        conflicting: Vec<i64>,
    },

    // Lookup failures
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    // Locker unusable in its current status
    #[error("Locker {locker_id} is unavailable: {status}")]
    Unavailable { locker_id: i64, status: String },

    // Hardware dispatch failures (reported, never fatal to the caller)
    #[error("Hardware error: {0}")]
    Hardware(String),

    // Access-code generation exhausted its retry bound
    #[error("Code generation failed after {attempts} attempts")]
    CodeGeneration { attempts: u32 },

    // Persistence failures
    #[error("Storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for the given entity and identifier.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns `true` if this error is a booking conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Returns `true` if this error is a validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display_lists_reservation_ids() {
        let err = Error::Conflict {
            locker_id: 3,
            conflicting: vec![10, 11],
        };
        let msg = err.to_string();
        assert!(msg.contains("locker 3"));
        assert!(msg.contains("10"));
        assert!(msg.contains("11"));
        assert!(err.is_conflict());
    }

    #[test]
    fn test_not_found_helper() {
        let err = Error::not_found("Locker", 42);
        assert_eq!(err.to_string(), "Locker not found: 42");
    }

    #[test]
    fn test_validation_helper() {
        let err = Error::validation("start_time must precede end_time");
        assert!(err.is_validation());
        assert!(err.to_string().contains("start_time"));
    }
}
