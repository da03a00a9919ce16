//! Locally owned accounts (admin tiers).
//!
//! This module holds the lifecycle rules for administrator accounts: creation
//! with a forced password change, suspension and restoration by a
//! super-admin, profile edits, and the password change that clears the forced
//! state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::{AccountId, DomainError, DomainResult};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Account Status
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can authenticate.
    #[default]
    Active,
    /// Account exists but has not been activated.
    Inactive,
    /// Account is blocked everywhere until restored.
    Suspended,
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AccountStatus::Active => f.write_str("active"),
            AccountStatus::Inactive => f.write_str("inactive"),
            AccountStatus::Suspended => f.write_str("suspended"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Account Record
// ─────────────────────────────────────────────────────────────────────────────

/// Profile fields supplied when an account is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A locally owned identity.
///
/// # Invariants
/// - `role` is always a local role.
/// - `email` is trimmed and lowercased.
/// - A suspended account is never authorized.
/// - With `force_password_change` set, only the password change is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    pub id: AccountId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub status: AccountStatus,
    pub role: Role,
    pub force_password_change: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    /// A freshly provisioned administrator: active, but must change the
    /// temporary password before doing anything else.
    pub fn provision_admin(
        id: AccountId,
        new: NewAccount,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::build(id, new, Role::Admin, true, password_hash, now)
    }

    /// Bootstrap super-admin created at first start; its password was chosen
    /// by the operator so no change is forced.
    pub fn bootstrap_super_admin(
        id: AccountId,
        new: NewAccount,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Self::build(id, new, Role::SuperAdmin, false, password_hash, now)
    }

    fn build(
        id: AccountId,
        new: NewAccount,
        role: Role,
        force_password_change: bool,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if !role.is_local() {
            return Err(DomainError::validation(format!(
                "role '{role}' is not owned by this service"
            )));
        }

        let email = new.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format"));
        }

        let first_name = non_blank(&new.first_name, "first name")?;
        let last_name = non_blank(&new.last_name, "last name")?;

        Ok(Self {
            id,
            email,
            first_name,
            last_name,
            status: AccountStatus::Active,
            role,
            force_password_change,
            password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }

    pub fn is_suspended(&self) -> bool {
        self.status == AccountStatus::Suspended
    }

    pub fn suspend(&mut self, actor: AccountId, now: DateTime<Utc>) -> DomainResult<()> {
        if self.is_suspended() {
            return Err(DomainError::invariant("account is already suspended"));
        }
        if self.id == actor {
            return Err(DomainError::forbidden("you cannot suspend your own account"));
        }
        self.status = AccountStatus::Suspended;
        self.updated_at = now;
        Ok(())
    }

    pub fn restore(&mut self, actor: AccountId, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_suspended() {
            return Err(DomainError::invariant("account is not suspended"));
        }
        if self.id == actor {
            return Err(DomainError::forbidden("you cannot restore your own account"));
        }
        self.status = AccountStatus::Active;
        self.updated_at = now;
        Ok(())
    }

    /// Update first and/or last name. Absent fields are left unchanged.
    pub fn rename(
        &mut self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let first_name = first_name.map(|v| non_blank(v, "first name")).transpose()?;
        let last_name = last_name.map(|v| non_blank(v, "last name")).transpose()?;

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Store a new password hash and lift the forced-change state.
    pub fn replace_password(&mut self, password_hash: String, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.force_password_change = false;
        self.updated_at = now;
    }
}

/// Self-service operations may only target the caller's own account.
pub fn ensure_self(actor: AccountId, target: AccountId, action: &str) -> DomainResult<()> {
    if actor != target {
        return Err(DomainError::forbidden(format!(
            "you can only {action} your own account"
        )));
    }
    Ok(())
}

fn non_blank(value: &str, field: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn account(id: u64, role: Role) -> AccountRecord {
        let now = Utc::now();
        AccountRecord {
            id: AccountId::new(id),
            email: format!("user{id}@example.com"),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            status: AccountStatus::Active,
            role,
            force_password_change: false,
            password_hash: "hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
