//! Process configuration, read once at startup.

use std::time::Duration;

use anyhow::Context;
use secrecy::{ExposeSecret, SecretString};

use backoffice_auth::{Role, RoleSecretRegistry};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5_000;

/// Where each remote role's owning service lives inside the cluster.
const DEFAULT_ENDPOINTS: [(Role, &str); 3] = [
    (
        Role::Client,
        "http://client-service.client.svc.cluster.local:3001/users",
    ),
    (
        Role::Restaurateur,
        "http://restaurateur-service.restaurateur.svc.cluster.local:3002/users",
    ),
    (
        Role::Deliverer,
        "http://delivery-service.delivery.svc.cluster.local:3003/users",
    ),
];

fn secret_var(role: Role) -> &'static str {
    match role {
        Role::Client => "CLIENT_SECRET",
        Role::Restaurateur => "RESTAURATEUR_SECRET",
        Role::Deliverer => "DELIVERY_SECRET",
        Role::Admin | Role::SuperAdmin => "AUTH_JWT_SECRET",
    }
}

fn endpoint_var(role: Role) -> Option<&'static str> {
    match role {
        Role::Client => Some("CLIENT_SERVICE_URL"),
        Role::Restaurateur => Some("RESTAURATEUR_SERVICE_URL"),
        Role::Deliverer => Some("DELIVERY_SERVICE_URL"),
        Role::Admin | Role::SuperAdmin => None,
    }
}

/// Operator-chosen credentials for the first super-admin.
pub struct SeedAccount {
    pub email: String,
    pub password: SecretString,
}

impl core::fmt::Debug for SeedAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SeedAccount")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SeedAccount {
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

#[derive(Debug)]
pub struct ApiConfig {
    pub port: u16,
    pub registry: RoleSecretRegistry,
    pub remote_timeout: Duration,
    pub seed: Option<SeedAccount>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing secrets are not an error
    /// here; they surface when routes are checked against the registry.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("APP_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("APP_PORT must be a port number, got '{raw}'"))?,
            None => DEFAULT_PORT,
        };

        let remote_timeout = match lookup("REMOTE_VERIFY_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().with_context(|| {
                format!("REMOTE_VERIFY_TIMEOUT_MS must be milliseconds, got '{raw}'")
            })?),
            None => Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
        };

        let mut builder = RoleSecretRegistry::builder();
        if let Some(secret) = lookup(secret_var(Role::Admin)) {
            builder = builder.local_secret(secret);
        }
        for (role, default_endpoint) in DEFAULT_ENDPOINTS {
            if let Some(secret) = lookup(secret_var(role)) {
                builder = builder.remote_secret(role, secret);
            }
            let endpoint = endpoint_var(role)
                .and_then(&lookup)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default_endpoint.to_string());
            builder = builder.remote_endpoint(role, &endpoint);
        }
        let registry = builder.build()?;

        let seed = match (
            lookup("SEED_SUPER_ADMIN_EMAIL"),
            lookup("SEED_SUPER_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) if !email.trim().is_empty() => Some(SeedAccount {
                email,
                password: SecretString::from(password),
            }),
            (Some(_), None) => {
                anyhow::bail!("SEED_SUPER_ADMIN_EMAIL is set but SEED_SUPER_ADMIN_PASSWORD is not")
            }
            _ => None,
        };

        Ok(Self {
            port,
            registry,
            remote_timeout,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use backoffice_auth::{ConfigError, RoleSet};
    use backoffice_core::SubjectId;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.remote_timeout, Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS));
        assert!(config.seed.is_none());
        assert_eq!(
            config
                .registry
                .endpoint_for(Role::Deliverer)
                .unwrap()
                .verify_url(SubjectId::new(7)),
            "http://delivery-service.delivery.svc.cluster.local:3003/users/verify/7"
        );
    }

    #[test]
    fn missing_secrets_show_up_as_gaps() {
        let config = ApiConfig::from_lookup(lookup(&[("CLIENT_SECRET", "c")])).unwrap();
        assert_eq!(
            config.registry.ensure_supports(&RoleSet::single(Role::Admin)),
            Err(ConfigError::MissingSecret(Role::Admin))
        );
        assert!(config.registry.ensure_supports(&RoleSet::single(Role::Client)).is_ok());
        assert_eq!(
            config
                .registry
                .ensure_supports(&RoleSet::new(Role::Client, [Role::Restaurateur])),
            Err(ConfigError::MissingSecret(Role::Restaurateur))
        );
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("APP_PORT", "9090"),
            ("AUTH_JWT_SECRET", "local"),
            ("CLIENT_SERVICE_URL", "localhost:4001/users/"),
            ("REMOTE_VERIFY_TIMEOUT_MS", "250"),
            ("SEED_SUPER_ADMIN_EMAIL", "root@example.com"),
            ("SEED_SUPER_ADMIN_PASSWORD", "changeme!"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.remote_timeout, Duration::from_millis(250));
        assert!(config.registry.secret_for(Role::SuperAdmin).is_ok());
        assert!(config.registry.secret_for(Role::Client).is_err());
        assert_eq!(
            config.registry.endpoint_for(Role::Client).unwrap().base(),
            "http://localhost:4001/users"
        );
        let seed = config.seed.unwrap();
        assert_eq!(seed.email, "root@example.com");
        assert_eq!(seed.password(), "changeme!");
        assert!(!format!("{seed:?}").contains("changeme!"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("AUTH_JWT_SECRET", "  "),
            ("RESTAURATEUR_SERVICE_URL", ""),
        ]))
        .unwrap();
        assert!(config.registry.secret_for(Role::Admin).is_err());
        assert_eq!(
            config.registry.endpoint_for(Role::Restaurateur).unwrap().base(),
            "http://restaurateur-service.restaurateur.svc.cluster.local:3002/users"
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(ApiConfig::from_lookup(lookup(&[("APP_PORT", "eighty")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("REMOTE_VERIFY_TIMEOUT_MS", "-1")])).is_err());
    }

    #[test]
    fn seed_email_without_password_is_rejected() {
        assert!(
            ApiConfig::from_lookup(lookup(&[("SEED_SUPER_ADMIN_EMAIL", "root@example.com")]))
                .is_err()
        );
    }
}
