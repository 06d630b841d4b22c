pub mod agents;
pub mod users;

use thiserror::Error;

use crate::models::error::DuplicateField;

/// Persistence-layer failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for {0}")]
    Duplicate(DuplicateField),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Maps unique-constraint violations onto the duplicate error so a lost
/// pre-check race still surfaces as a duplicate rather than a 500.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(constraint) = db_err.constraint() {
            if constraint.contains("email") {
                return StoreError::Duplicate(DuplicateField::Email);
            }
            if constraint.contains("mobile") {
                return StoreError::Duplicate(DuplicateField::MobileNumber);
            }
        }
    }
    StoreError::Database(err)
}
