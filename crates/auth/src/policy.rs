use serde::Serialize;
use thiserror::Error;

use crate::account::{AccountRecord, AccountStatus};

/// What the caller is trying to do, as far as account state is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Any ordinary endpoint.
    #[default]
    General,
    /// The password-change endpoint, the one thing a forced-change account may do.
    PasswordChange,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("account is suspended")]
    Suspended,

    #[error("password must be changed before continuing")]
    PasswordChangeRequired,
}

/// Account lifecycle rules applied to every resolved local identity.
///
/// - No IO
/// - Suspension wins over everything, including the password change.
pub fn evaluate(account: &AccountRecord, operation: Operation) -> Result<(), PolicyViolation> {
    if account.status == AccountStatus::Suspended {
        return Err(PolicyViolation::Suspended);
    }
    if account.force_password_change && operation != Operation::PasswordChange {
        return Err(PolicyViolation::PasswordChangeRequired);
    }
    Ok(())
}
