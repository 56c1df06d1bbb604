//! The module contains the errors the ledger can throw.

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
///
/// Store failures propagate unchanged as [`Database`]; the ledger performs no
/// automatic retry. "Already a member" is advisory rather than an error and
/// is reported as [`MemberAddition::AlreadyMember`].
///
/// [`Database`]: LedgerError::Database
/// [`MemberAddition::AlreadyMember`]: crate::MemberAddition::AlreadyMember
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
