//! The authorization guard chain.
//!
//! One implementation serves every protected endpoint; endpoints differ only
//! by their [`GuardPolicy`]. Which path runs is decided from the policy alone:
//!
//! - **local** when the allowed set contains `admin` or `super-admin`: one
//!   secret, then account lookup and the account state policy;
//! - **remote** otherwise: each allowed role is tried in configured order with
//!   its own secret, and the owning service must confirm the subject.
//!
//! The token's claimed role never selects the path.

use std::sync::Arc;

use backoffice_core::AccountId;

use crate::claims::{self, VerificationError};
use crate::error::AuthError;
use crate::policy::{self, Operation};
use crate::principal::AuthenticatedIdentity;
use crate::remote::RemoteRoleVerifier;
use crate::secrets::RoleSecretRegistry;
use crate::store::IdentityStore;
use crate::{Role, RoleSet};

/// Per-endpoint authorization requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    allowed: RoleSet,
    operation: Operation,
}

impl GuardPolicy {
    pub fn new(allowed: RoleSet) -> Self {
        Self {
            allowed,
            operation: Operation::General,
        }
    }

    /// Policy for the password-change endpoint, the only one reachable while a
    /// password change is forced.
    pub fn password_change(allowed: RoleSet) -> Self {
        Self {
            allowed,
            operation: Operation::PasswordChange,
        }
    }

    pub fn allowed(&self) -> &RoleSet {
        &self.allowed
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }
}

/// Result of trying one remote candidate role.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CandidateOutcome {
    Confirmed(AuthenticatedIdentity),
    /// The token does not verify under this role's secret.
    Unverified(VerificationError),
    /// Verified, but issued for a different role.
    RoleMismatch(Role),
    /// The owning service did not confirm the subject.
    NotConfirmed,
}

#[derive(Clone)]
pub struct GuardChain {
    registry: Arc<RoleSecretRegistry>,
    identities: Arc<dyn IdentityStore>,
    remote: Arc<dyn RemoteRoleVerifier>,
}

impl GuardChain {
    pub fn new(
        registry: Arc<RoleSecretRegistry>,
        identities: Arc<dyn IdentityStore>,
        remote: Arc<dyn RemoteRoleVerifier>,
    ) -> Self {
        Self {
            registry,
            identities,
            remote,
        }
    }

    pub fn registry(&self) -> &RoleSecretRegistry {
        &self.registry
    }

    /// Decide whether `token` may access an endpoint guarded by `policy`.
    pub async fn authorize(
        &self,
        policy: &GuardPolicy,
        token: Option<&str>,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        if policy.allowed().has_local() {
            self.authorize_local(policy, token).await
        } else {
            self.authorize_remote(policy.allowed(), token).await
        }
    }

    async fn authorize_local(
        &self,
        policy: &GuardPolicy,
        token: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let allowed = policy.allowed();
        let local_role = allowed
            .local_roles()
            .next()
            .ok_or(AuthError::Forbidden)?;
        let secret = self.registry.secret_for(local_role)?;

        let claims = claims::verify(token, secret).map_err(|e| {
            tracing::debug!(error = %e, "local token rejected");
            AuthError::InvalidCredential(e)
        })?;

        if !allowed.contains(claims.role) {
            return Err(AuthError::ForbiddenRole(claims.role));
        }

        let account = self
            .identities
            .find_by_id(AccountId::from(claims.id))
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        // The store is authoritative for local roles: a token minted before a
        // role change must not outlive it.
        if !allowed.contains(account.role) {
            return Err(AuthError::ForbiddenRole(account.role));
        }

        policy::evaluate(&account, policy.operation())?;

        Ok(AuthenticatedIdentity::new(claims.id, claims.role))
    }

    async fn authorize_remote(
        &self,
        allowed: &RoleSet,
        token: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        for role in allowed.iter() {
            match self.try_candidate(role, token).await? {
                CandidateOutcome::Confirmed(identity) => return Ok(identity),
                CandidateOutcome::Unverified(e) => {
                    tracing::debug!(%role, error = %e, "token does not verify for candidate");
                }
                CandidateOutcome::RoleMismatch(claimed) => {
                    tracing::debug!(%role, %claimed, "token issued for another role");
                }
                CandidateOutcome::NotConfirmed => {
                    tracing::debug!(%role, "owning service did not confirm subject");
                }
            }
        }
        Err(AuthError::Forbidden)
    }

    /// Only configuration errors escape as `Err`; every other failure is a
    /// per-candidate outcome.
    async fn try_candidate(&self, role: Role, token: &str) -> Result<CandidateOutcome, AuthError> {
        let secret = self.registry.secret_for(role)?;

        let claims = match claims::verify(token, secret) {
            Ok(claims) => claims,
            Err(e) => return Ok(CandidateOutcome::Unverified(e)),
        };
        if claims.role != role {
            return Ok(CandidateOutcome::RoleMismatch(claims.role));
        }

        let endpoint = self.registry.endpoint_for(role)?;
        if self.remote.confirm(endpoint, claims.id, token).await {
            Ok(CandidateOutcome::Confirmed(AuthenticatedIdentity::new(claims.id, role)))
        } else {
            Ok(CandidateOutcome::NotConfirmed)
        }
    }
}
