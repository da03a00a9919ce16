use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role carried in a bearer token.
///
/// The set is closed. `Admin` and `SuperAdmin` are owned by this backend
/// (local); the others are owned by the client, restaurateur and delivery
/// services (remote). Locality is a property of the variant and is never read
/// from a token.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Client,
    Restaurateur,
    Deliverer,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Client,
        Role::Restaurateur,
        Role::Deliverer,
        Role::Admin,
        Role::SuperAdmin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Restaurateur => "restaurateur",
            Role::Deliverer => "deliverer",
            Role::Admin => "admin",
            Role::SuperAdmin => "super-admin",
        }
    }

    /// Whether identities of this role are stored and authenticated here.
    pub fn is_local(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_remote(&self) -> bool {
        !self.is_local()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Ordered, non-empty, duplicate-free set of roles allowed on an endpoint.
///
/// Iteration follows the order the set was configured in; the remote path of
/// the guard chain tries candidates in exactly this order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSet(Vec<Role>);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("allowed-role set must not be empty")]
pub struct EmptyRoleSet;

impl RoleSet {
    /// Build a set from a first role plus any others (duplicates are dropped,
    /// first occurrence wins).
    pub fn new(first: Role, rest: impl IntoIterator<Item = Role>) -> Self {
        let mut roles = vec![first];
        for role in rest {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self(roles)
    }

    pub fn single(role: Role) -> Self {
        Self(vec![role])
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn local_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.iter().filter(Role::is_local)
    }

    pub fn remote_roles(&self) -> impl Iterator<Item = Role> + '_ {
        self.iter().filter(Role::is_remote)
    }

    /// Whether the endpoint is served by the local (single-secret) path.
    pub fn has_local(&self) -> bool {
        self.0.iter().any(Role::is_local)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn as_slice(&self) -> &[Role] {
        &self.0
    }
}

impl TryFrom<Vec<Role>> for RoleSet {
    type Error = EmptyRoleSet;

    fn try_from(value: Vec<Role>) -> Result<Self, Self::Error> {
        let mut iter = value.into_iter();
        let first = iter.next().ok_or(EmptyRoleSet)?;
        Ok(Self::new(first, iter))
    }
}

impl core::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let names: Vec<&str> = self.0.iter().map(Role::as_str).collect();
        f.write_str(&names.join(","))
    }
}
