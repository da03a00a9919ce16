//! Role → secret / endpoint bindings.
//!
//! Built once at start-up from configuration and shared read-only (behind an
//! `Arc`) by every authorization. A missing binding is a deployment error,
//! reported as [`ConfigError`], never as a caller-side denial.

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use backoffice_core::SubjectId;

use crate::{Role, RoleSet};

/// Verification secret for one trust domain.
#[derive(Debug)]
pub struct Secret(SecretString);

impl Secret {
    /// Wrap secret material; blank values are treated as absent.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::from(value)))
    }

    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

/// Base URL of the service that owns a remote role.
///
/// Confirmation calls go to `{base}/verify/{subject_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    base: String,
}

impl RemoteEndpoint {
    /// Parse a base such as `http://client-service:3001/users`.
    ///
    /// A bare `host:port/path` is taken as plain `http`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_end_matches('/');
        if raw.is_empty() {
            return None;
        }
        let base = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };
        Some(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn verify_url(&self, subject_id: SubjectId) -> String {
        format!("{}/verify/{}", self.base, subject_id)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no verification secret configured for role '{0}'")]
    MissingSecret(Role),

    #[error("no verification endpoint configured for role '{0}'")]
    MissingEndpoint(Role),

    #[error("role '{0}' is locally owned and has no remote endpoint")]
    NotRemote(Role),

    #[error("invalid endpoint for role '{role}': {reason}")]
    InvalidEndpoint { role: Role, reason: String },
}

#[derive(Debug, Default)]
struct RemoteBinding {
    secret: Option<Secret>,
    endpoint: Option<RemoteEndpoint>,
}

/// Immutable registry of per-role verification material.
///
/// Local roles share the backend-wide secret; each remote role has its own
/// secret and owning-service endpoint.
#[derive(Debug, Default)]
pub struct RoleSecretRegistry {
    local: Option<Secret>,
    remote: HashMap<Role, RemoteBinding>,
}

impl RoleSecretRegistry {
    pub fn builder() -> RoleSecretRegistryBuilder {
        RoleSecretRegistryBuilder::default()
    }

    pub fn secret_for(&self, role: Role) -> Result<&Secret, ConfigError> {
        let secret = if role.is_local() {
            self.local.as_ref()
        } else {
            self.remote.get(&role).and_then(|b| b.secret.as_ref())
        };
        secret.ok_or(ConfigError::MissingSecret(role))
    }

    pub fn endpoint_for(&self, role: Role) -> Result<&RemoteEndpoint, ConfigError> {
        if role.is_local() {
            return Err(ConfigError::NotRemote(role));
        }
        self.remote
            .get(&role)
            .and_then(|b| b.endpoint.as_ref())
            .ok_or(ConfigError::MissingEndpoint(role))
    }

    /// Check that every role an endpoint allows can actually be evaluated.
    ///
    /// Local roles need the local secret; remote roles need both a secret and
    /// an endpoint.
    pub fn ensure_supports(&self, allowed: &RoleSet) -> Result<(), ConfigError> {
        for role in allowed.iter() {
            self.secret_for(role)?;
            if role.is_remote() {
                self.endpoint_for(role)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RoleSecretRegistryBuilder {
    local: Option<Secret>,
    remote: HashMap<Role, RemoteBinding>,
    errors: Vec<ConfigError>,
}

impl RoleSecretRegistryBuilder {
    /// Secret shared by all locally owned roles. Blank values are ignored.
    pub fn local_secret(mut self, secret: impl Into<String>) -> Self {
        self.local = Secret::new(secret);
        self
    }

    pub fn remote_secret(mut self, role: Role, secret: impl Into<String>) -> Self {
        if role.is_local() {
            self.errors.push(ConfigError::NotRemote(role));
            return self;
        }
        self.remote.entry(role).or_default().secret = Secret::new(secret);
        self
    }

    pub fn remote_endpoint(mut self, role: Role, endpoint: &str) -> Self {
        if role.is_local() {
            self.errors.push(ConfigError::NotRemote(role));
            return self;
        }
        match RemoteEndpoint::parse(endpoint) {
            Some(endpoint) => self.remote.entry(role).or_default().endpoint = Some(endpoint),
            None => self.errors.push(ConfigError::InvalidEndpoint {
                role,
                reason: "endpoint is blank".to_string(),
            }),
        }
        self
    }

    /// Finish the registry. Bindings attempted for local roles or blank
    /// endpoints are rejected here; missing bindings are not, they surface
    /// through [`RoleSecretRegistry::ensure_supports`].
    pub fn build(self) -> Result<RoleSecretRegistry, ConfigError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }
        Ok(RoleSecretRegistry {
            local: self.local,
            remote: self.remote,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RoleSecretRegistry {
        RoleSecretRegistry::builder()
            .local_secret("local")
            .remote_secret(Role::Client, "client")
            .remote_endpoint(Role::Client, "client-service:3001/users")
            .remote_secret(Role::Restaurateur, "resto")
            .build()
            .unwrap()
    }

    #[test]
    fn local_roles_share_the_local_secret() {
        let reg = registry();
        assert_eq!(reg.secret_for(Role::Admin).unwrap().expose(), b"local");
        assert_eq!(reg.secret_for(Role::SuperAdmin).unwrap().expose(), b"local");
    }

    #[test]
    fn remote_roles_have_distinct_secrets() {
        let reg = registry();
        assert_eq!(reg.secret_for(Role::Client).unwrap().expose(), b"client");
        assert_eq!(reg.secret_for(Role::Restaurateur).unwrap().expose(), b"resto");
        assert_eq!(
            reg.secret_for(Role::Deliverer).unwrap_err(),
            ConfigError::MissingSecret(Role::Deliverer)
        );
    }

    #[test]
    fn endpoints_are_remote_only() {
        let reg = registry();
        let endpoint = reg.endpoint_for(Role::Client).unwrap();
        assert_eq!(
            endpoint.verify_url(SubjectId::new(5)),
            "http://client-service:3001/users/verify/5"
        );
        assert_eq!(
            reg.endpoint_for(Role::Admin).unwrap_err(),
            ConfigError::NotRemote(Role::Admin)
        );
        assert_eq!(
            reg.endpoint_for(Role::Restaurateur).unwrap_err(),
            ConfigError::MissingEndpoint(Role::Restaurateur)
        );
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let reg = RoleSecretRegistry::builder().local_secret("   ").build().unwrap();
        assert_eq!(
            reg.secret_for(Role::Admin).unwrap_err(),
            ConfigError::MissingSecret(Role::Admin)
        );
    }

    #[test]
    fn ensure_supports_reports_the_first_gap() {
        let reg = registry();
        assert!(reg.ensure_supports(&RoleSet::new(Role::Admin, [Role::SuperAdmin])).is_ok());
        assert!(reg.ensure_supports(&RoleSet::single(Role::Client)).is_ok());
        assert_eq!(
            reg.ensure_supports(&RoleSet::new(Role::Client, [Role::Restaurateur])),
            Err(ConfigError::MissingEndpoint(Role::Restaurateur))
        );

        let empty = RoleSecretRegistry::builder().build().unwrap();
        assert_eq!(
            empty.ensure_supports(&RoleSet::single(Role::Admin)),
            Err(ConfigError::MissingSecret(Role::Admin))
        );
    }

    #[test]
    fn binding_a_local_role_remotely_is_rejected() {
        let err = RoleSecretRegistry::builder()
            .remote_secret(Role::Admin, "nope")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NotRemote(Role::Admin));
    }

    #[test]
    fn endpoint_keeps_explicit_scheme_and_trims_slash() {
        let endpoint = RemoteEndpoint::parse("https://delivery.example/users/").unwrap();
        assert_eq!(endpoint.base(), "https://delivery.example/users");
        assert!(RemoteEndpoint::parse("  ").is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let rendered = format!("{:?}", registry());
        assert!(!rendered.contains("client\""));
        assert!(!rendered.contains("\"local\""));
    }
}
