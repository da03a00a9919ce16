use thiserror::Error;

use crate::Role;
use crate::claims::VerificationError;
use crate::policy::PolicyViolation;
use crate::secrets::ConfigError;
use crate::store::StoreError;

/// Terminal outcome of a rejected authorization.
///
/// Transport-agnostic; the HTTP layer maps each variant to a status code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingCredential,

    /// The token failed verification against the only applicable secret.
    #[error("invalid token: {0}")]
    InvalidCredential(VerificationError),

    #[error("role '{0}' is not allowed on this endpoint")]
    ForbiddenRole(Role),

    /// No remote candidate both verified and was confirmed. Deliberately
    /// carries no detail.
    #[error("forbidden")]
    Forbidden,

    /// Valid token, but no account backs its subject.
    #[error("unknown account")]
    Unauthenticated,

    #[error("account is suspended")]
    Suspended,

    #[error("password must be changed before continuing")]
    PasswordChangeRequired,

    /// The deployment cannot evaluate this endpoint.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("identity store error: {0}")]
    Store(String),
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::InvalidCredential(_) => "invalid_credential",
            AuthError::ForbiddenRole(_) => "forbidden_role",
            AuthError::Forbidden => "forbidden",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Suspended => "account_suspended",
            AuthError::PasswordChangeRequired => "password_change_required",
            AuthError::Configuration(_) => "configuration_error",
            AuthError::Store(_) => "identity_store_error",
        }
    }

    /// Server-side failures, as opposed to rejections of the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Configuration(_) | AuthError::Store(_))
    }
}

impl From<PolicyViolation> for AuthError {
    fn from(value: PolicyViolation) -> Self {
        match value {
            PolicyViolation::Suspended => AuthError::Suspended,
            PolicyViolation::PasswordChangeRequired => AuthError::PasswordChangeRequired,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        AuthError::Store(value.to_string())
    }
}
