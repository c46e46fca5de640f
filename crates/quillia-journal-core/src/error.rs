//! Journal errors

use thiserror::Error;

/// Journal errors
#[derive(Error, Debug)]
pub enum JournalError {
    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Character not found
    #[error("character not found")]
    CharacterNotFound,

    /// Story/image generation collaborator failed
    ///
    /// Generation failures abort entry creation before any ledger or
    /// usage mutation occurs.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Stat judging collaborator failed
    ///
    /// Callers in the entry pipeline catch and log this; it never fails
    /// entry creation.
    #[error("stat judgement failed: {0}")]
    Judge(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] quillia_db::DbError),

    /// Billing layer error
    #[error("billing error: {0}")]
    Billing(#[from] quillia_billing_core::BillingError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}
