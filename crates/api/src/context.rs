use backoffice_auth::{AuthenticatedIdentity, Role};
use backoffice_core::{AccountId, SubjectId};

/// Principal context for a request that passed the guard chain.
///
/// Inserted into the request extensions by the auth middleware; handlers
/// extract it with `Extension<PrincipalContext>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    identity: AuthenticatedIdentity,
}

impl PrincipalContext {
    pub fn new(identity: AuthenticatedIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> AuthenticatedIdentity {
        self.identity
    }

    pub fn subject_id(&self) -> SubjectId {
        self.identity.subject_id()
    }

    pub fn role(&self) -> Role {
        self.identity.role()
    }

    /// Present only for locally owned roles.
    pub fn account_id(&self) -> Option<AccountId> {
        self.identity.account_id()
    }
}
