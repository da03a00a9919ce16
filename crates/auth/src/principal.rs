use serde::Serialize;

use backoffice_core::{AccountId, SubjectId};

use crate::Role;

/// Identity resolved by a successful authorization decision.
///
/// Lives for one request (attached to the request extensions by the HTTP
/// layer) and is never persisted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AuthenticatedIdentity {
    subject_id: SubjectId,
    role: Role,
}

impl AuthenticatedIdentity {
    pub fn new(subject_id: SubjectId, role: Role) -> Self {
        Self { subject_id, role }
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// The local account behind this identity, if the role is locally owned.
    pub fn account_id(&self) -> Option<AccountId> {
        self.role.is_local().then(|| AccountId::from(self.subject_id))
    }
}
