use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backoffice_core::SubjectId;

use crate::Role;
use crate::secrets::Secret;

/// Claims carried by every bearer token this backend accepts.
///
/// Field names follow the token format shared with the other services
/// (`id`, `role`), not the registered `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: SubjectId,
    pub role: Role,

    /// Issued-at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// Not a decodable HS256 token with the expected claims.
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token has expired")]
    Expired,

    #[error("token signature does not match")]
    SignatureMismatch,
}

/// Verify `token` against `secret` and decode its claims.
///
/// Succeeds only for an HS256 signature made with `secret` and an `exp` still
/// in the future (no leeway). Pure; safe to call with any secret.
pub fn verify(token: &str, secret: &Secret) -> Result<TokenClaims, VerificationError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    // Issuers may stamp an audience; only signature and expiry decide.
    validation.validate_aud = false;

    let key = DecodingKey::from_secret(secret.expose());
    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => VerificationError::Expired,
            ErrorKind::InvalidSignature => VerificationError::SignatureMismatch,
            _ => VerificationError::Malformed(e.to_string()),
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header};

    use super::*;

    /// Mint an HS256 token the way the issuing services do.
    pub fn mint(secret: &str, id: u64, role: Role, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = TokenClaims {
            id: SubjectId::new(id),
            role,
            iat: Some(now.timestamp()),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("failed to encode jwt")
    }

    pub fn mint_valid(secret: &str, id: u64, role: Role) -> String {
        mint(secret, id, role, Duration::minutes(10))
    }
}
