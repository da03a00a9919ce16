use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use backoffice_auth::account::ensure_self;
use backoffice_auth::password::{self, PasswordError};
use backoffice_auth::{
    AccountRecord, AccountRepository, ConfigError, CredentialDelivery, CredentialNotifier,
    GuardChain, GuardPolicy, HttpRoleVerifier, InMemoryAccountStore, LogNotifier,
    NewAccount, Page, RemoteRoleVerifier, RoleSecretRegistry, StoreError,
};
use backoffice_core::{AccountId, DomainError};

use crate::config::{ApiConfig, SeedAccount};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("{0}")]
    WeakPassword(String),

    #[error("{0}")]
    Conflict(String),

    #[error("user not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            StoreError::NotFound => ServiceError::NotFound,
            StoreError::Unavailable(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        match value {
            PasswordError::TooShort => ServiceError::WeakPassword(value.to_string()),
            PasswordError::Hashing(msg) => ServiceError::Internal(msg),
        }
    }
}

/// Shared state for handlers: the account store, the credential channel and
/// the guard chain every protected route group runs through.
pub struct AppServices {
    pub accounts: Arc<dyn AccountRepository>,
    pub notifier: Arc<dyn CredentialNotifier>,
    pub guard: Arc<GuardChain>,
}

impl AppServices {
    pub fn new<S>(
        store: Arc<S>,
        notifier: Arc<dyn CredentialNotifier>,
        registry: RoleSecretRegistry,
        remote: Arc<dyn RemoteRoleVerifier>,
    ) -> Self
    where
        S: AccountRepository + 'static,
    {
        let guard = GuardChain::new(Arc::new(registry), store.clone(), remote);
        Self {
            accounts: store,
            notifier,
            guard: Arc::new(guard),
        }
    }

    /// Route groups whose allowed roles cannot be evaluated with the current
    /// registry.
    pub fn configuration_gaps(
        &self,
        groups: &[(&'static str, GuardPolicy)],
    ) -> Vec<(&'static str, ConfigError)> {
        groups
            .iter()
            .filter_map(|(name, policy)| {
                self.guard
                    .registry()
                    .ensure_supports(policy.allowed())
                    .err()
                    .map(|err| (*name, err))
            })
            .collect()
    }

    pub async fn list_accounts(
        &self,
        page: Page,
    ) -> Result<(Vec<AccountRecord>, u64), ServiceError> {
        Ok(self.accounts.list(page).await?)
    }

    /// Provision an admin with a temporary password and send it out.
    pub async fn create_admin(&self, new: NewAccount) -> Result<AccountRecord, ServiceError> {
        let email = new.email.trim().to_lowercase();
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("user already exists".to_string()));
        }

        let temporary = password::temporary_password();
        let hash = password::hash_password(&temporary)?;
        let id = self.accounts.next_id().await?;
        let account = AccountRecord::provision_admin(id, new, hash, Utc::now())?;
        self.accounts.insert(account.clone()).await?;

        let delivery = CredentialDelivery {
            to: account.email.clone(),
            full_name: account.full_name(),
            temporary_password: temporary,
        };
        if let Err(err) = self.notifier.send_credentials(delivery).await {
            // Without the credentials the account is unusable.
            self.accounts.delete(account.id).await?;
            return Err(ServiceError::Internal(err.to_string()));
        }

        tracing::info!(account_id = %account.id, "admin account created");
        Ok(account)
    }

    pub async fn get_own(
        &self,
        actor: AccountId,
        target: AccountId,
    ) -> Result<AccountRecord, ServiceError> {
        ensure_self(actor, target, "view")?;
        self.load(target).await
    }

    pub async fn update_own(
        &self,
        actor: AccountId,
        target: AccountId,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<AccountRecord, ServiceError> {
        ensure_self(actor, target, "update")?;
        let mut account = self.load(target).await?;
        account.rename(first_name, last_name, Utc::now())?;
        self.accounts.update(account.clone()).await?;
        Ok(account)
    }

    pub async fn delete_own(&self, actor: AccountId, target: AccountId) -> Result<(), ServiceError> {
        ensure_self(actor, target, "delete")?;
        self.accounts.delete(target).await?;
        tracing::info!(account_id = %target, "account deleted");
        Ok(())
    }

    pub async fn suspend(&self, actor: AccountId, target: AccountId) -> Result<(), ServiceError> {
        let mut account = self.load(target).await?;
        account.suspend(actor, Utc::now())?;
        self.accounts.update(account).await?;
        tracing::info!(account_id = %target, by = %actor, "account suspended");
        Ok(())
    }

    pub async fn restore(&self, actor: AccountId, target: AccountId) -> Result<(), ServiceError> {
        let mut account = self.load(target).await?;
        account.restore(actor, Utc::now())?;
        self.accounts.update(account).await?;
        tracing::info!(account_id = %target, by = %actor, "account restored");
        Ok(())
    }

    /// Confirms to a peer that `target` exists and belongs to the caller.
    pub async fn verify_own(&self, actor: AccountId, target: AccountId) -> Result<(), ServiceError> {
        ensure_self(actor, target, "verify")?;
        self.load(target).await.map(|_| ())
    }

    pub async fn change_password(
        &self,
        actor: AccountId,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        password::validate_new_password(new_password)?;
        let mut account = self.load(actor).await?;
        let hash = password::hash_password(new_password)?;
        account.replace_password(hash, Utc::now());
        self.accounts.update(account).await?;
        tracing::info!(account_id = %actor, "password changed");
        Ok(())
    }

    /// Create the first super-admin unless an account with that email exists.
    pub async fn seed_super_admin(
        &self,
        seed: &SeedAccount,
    ) -> Result<Option<AccountRecord>, ServiceError> {
        let email = seed.email.trim().to_lowercase();
        if self.accounts.find_by_email(&email).await?.is_some() {
            return Ok(None);
        }

        password::validate_new_password(seed.password())?;
        let hash = password::hash_password(seed.password())?;
        let id = self.accounts.next_id().await?;
        let account = AccountRecord::bootstrap_super_admin(
            id,
            NewAccount {
                email,
                first_name: "Super".to_string(),
                last_name: "Admin".to_string(),
            },
            hash,
            Utc::now(),
        )?;
        self.accounts.insert(account.clone()).await?;
        tracing::info!(account_id = %account.id, "super-admin seeded");
        Ok(Some(account))
    }

    async fn load(&self, id: AccountId) -> Result<AccountRecord, ServiceError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }
}

/// Production wiring: in-memory account store, log-based credential delivery,
/// HTTP confirmation against the owning services.
pub async fn build_services(config: ApiConfig) -> anyhow::Result<Arc<AppServices>> {
    let remote = HttpRoleVerifier::new(config.remote_timeout)?;
    let services = AppServices::new(
        Arc::new(InMemoryAccountStore::new()),
        Arc::new(LogNotifier),
        config.registry,
        Arc::new(remote),
    );

    if let Some(seed) = &config.seed {
        services
            .seed_super_admin(seed)
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed super-admin: {e}"))?;
    }

    Ok(Arc::new(services))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use backoffice_auth::{AccountStatus, NotifyError, RemoteEndpoint, Role, RoleSet};
    use backoffice_core::SubjectId;

    use super::*;

    #[derive(Default)]
    struct CapturingNotifier {
        sent: Mutex<Vec<CredentialDelivery>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl CredentialNotifier for CapturingNotifier {
        async fn send_credentials(&self, delivery: CredentialDelivery) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(delivery);
            Ok(())
        }
    }

    struct NeverConfirms;

    #[async_trait::async_trait]
    impl RemoteRoleVerifier for NeverConfirms {
        async fn confirm(&self, _: &RemoteEndpoint, _: SubjectId, _: &str) -> bool {
            false
        }
    }

    fn services(notifier: Arc<CapturingNotifier>) -> AppServices {
        AppServices::new(
            Arc::new(InMemoryAccountStore::new()),
            notifier,
            RoleSecretRegistry::builder()
                .local_secret("local")
                .build()
                .unwrap(),
            Arc::new(NeverConfirms),
        )
    }

    fn new_admin(email: &str) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
        }
    }

    #[tokio::test]
    async fn created_admin_receives_a_working_temporary_password() {
        let notifier = Arc::new(CapturingNotifier::default());
        let svc = services(notifier.clone());

        let account = svc.create_admin(new_admin("jane@example.com")).await.unwrap();
        assert_eq!(account.role, Role::Admin);
        assert!(account.force_password_change);

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert!(password::verify_password(
            &sent[0].temporary_password,
            &account.password_hash
        ));
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        svc.create_admin(new_admin("jane@example.com")).await.unwrap();
        assert!(matches!(
            svc.create_admin(new_admin(" JANE@example.com ")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn failed_delivery_rolls_back_the_account() {
        let svc = services(Arc::new(CapturingNotifier {
            fail: true,
            ..Default::default()
        }));
        assert!(matches!(
            svc.create_admin(new_admin("jane@example.com")).await,
            Err(ServiceError::Internal(_))
        ));
        let (items, total) = svc.list_accounts(Page::default()).await.unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn self_service_is_limited_to_own_account() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        let a = svc.create_admin(new_admin("a@example.com")).await.unwrap();
        let b = svc.create_admin(new_admin("b@example.com")).await.unwrap();

        assert!(svc.get_own(a.id, a.id).await.is_ok());
        assert!(matches!(
            svc.get_own(a.id, b.id).await,
            Err(ServiceError::Domain(DomainError::Forbidden(_)))
        ));
        assert!(matches!(
            svc.delete_own(a.id, b.id).await,
            Err(ServiceError::Domain(DomainError::Forbidden(_)))
        ));

        let renamed = svc
            .update_own(a.id, a.id, Some("Grace"), None)
            .await
            .unwrap();
        assert_eq!(renamed.first_name, "Grace");

        svc.delete_own(a.id, a.id).await.unwrap();
        assert!(matches!(
            svc.verify_own(a.id, a.id).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn suspend_and_restore_round() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        let root = svc
            .seed_super_admin(&SeedAccount {
                email: "root@example.com".to_string(),
                password: "rootpassword".to_string().into(),
            })
            .await
            .unwrap()
            .unwrap();
        let admin = svc.create_admin(new_admin("a@example.com")).await.unwrap();

        svc.suspend(root.id, admin.id).await.unwrap();
        let stored = svc.accounts.find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Suspended);

        assert!(matches!(
            svc.suspend(root.id, admin.id).await,
            Err(ServiceError::Domain(DomainError::InvariantViolation(_)))
        ));
        assert!(matches!(
            svc.suspend(root.id, root.id).await,
            Err(ServiceError::Domain(DomainError::Forbidden(_)))
        ));
        assert!(matches!(
            svc.suspend(root.id, AccountId::new(999)).await,
            Err(ServiceError::NotFound)
        ));

        svc.restore(root.id, admin.id).await.unwrap();
        let stored = svc.accounts.find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(stored.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn password_change_clears_forced_flag() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        let admin = svc.create_admin(new_admin("a@example.com")).await.unwrap();

        assert!(matches!(
            svc.change_password(admin.id, "short").await,
            Err(ServiceError::WeakPassword(_))
        ));

        svc.change_password(admin.id, "a-much-longer-one").await.unwrap();
        let stored = svc.accounts.find_by_id(admin.id).await.unwrap().unwrap();
        assert!(!stored.force_password_change);
        assert!(password::verify_password("a-much-longer-one", &stored.password_hash));
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        let seed = SeedAccount {
            email: "root@example.com".to_string(),
            password: "rootpassword".to_string().into(),
        };
        assert!(svc.seed_super_admin(&seed).await.unwrap().is_some());
        assert!(svc.seed_super_admin(&seed).await.unwrap().is_none());
        let (_, total) = svc.list_accounts(Page::default()).await.unwrap();
        assert_eq!(total, 1);
    }

    #[test]
    fn gaps_name_the_route_group() {
        let svc = services(Arc::new(CapturingNotifier::default()));
        let groups = [
            ("admins", GuardPolicy::new(RoleSet::single(Role::Admin))),
            ("services", GuardPolicy::new(RoleSet::single(Role::Client))),
        ];
        let gaps = svc.configuration_gaps(&groups);
        assert_eq!(gaps, vec![("services", ConfigError::MissingSecret(Role::Client))]);
    }
}
