//! `backoffice-auth` — authentication/authorization gateway.
//!
//! Decoupled from HTTP: the API crate extracts the bearer token and maps
//! [`AuthError`] to responses; everything in between lives here.

pub mod account;
pub mod claims;
pub mod error;
pub mod guard;
pub mod notify;
pub mod password;
pub mod policy;
pub mod principal;
pub mod remote;
pub mod roles;
pub mod secrets;
pub mod store;

pub use account::{AccountRecord, AccountStatus, NewAccount};
pub use claims::{TokenClaims, VerificationError, verify};
pub use error::AuthError;
pub use guard::{GuardChain, GuardPolicy};
pub use notify::{CredentialDelivery, CredentialNotifier, LogNotifier, NotifyError};
pub use policy::{Operation, PolicyViolation};
pub use principal::AuthenticatedIdentity;
pub use remote::{HttpRoleVerifier, RemoteRoleVerifier};
pub use roles::{Role, RoleSet};
pub use secrets::{ConfigError, RemoteEndpoint, RoleSecretRegistry, Secret};
pub use store::{AccountRepository, IdentityStore, InMemoryAccountStore, Page, StoreError};
