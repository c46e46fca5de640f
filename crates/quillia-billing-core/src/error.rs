//! Billing errors

use thiserror::Error;

/// Billing errors
///
/// Expected user-facing denials (insufficient vials, quota reached,
/// locked character) are structured result values, not error variants;
/// these variants cover actual failures.
#[derive(Error, Debug)]
pub enum BillingError {
    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Character not found
    #[error("character not found")]
    CharacterNotFound,

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] quillia_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
