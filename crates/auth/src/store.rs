//! Account persistence seams.
//!
//! [`IdentityStore`] is the read-only lookup the guard chain depends on;
//! [`AccountRepository`] adds the administrative write path. The in-memory
//! implementation backs dev runs and tests.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use backoffice_core::AccountId;

use crate::account::AccountRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("account not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup of locally owned identities by id.
#[async_trait::async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError>;
}

/// Page request (1-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: u32,
    limit: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 100;

    /// Clamp raw query values into a valid page.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_sub(1) * self.limit as usize
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Administrative write path over local accounts.
#[async_trait::async_trait]
pub trait AccountRepository: IdentityStore {
    /// Reserve a fresh identifier.
    async fn next_id(&self) -> Result<AccountId, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError>;

    /// Insert a new account. Fails with `Conflict` on a duplicate id or email.
    async fn insert(&self, account: AccountRecord) -> Result<(), StoreError>;

    /// Replace an existing account.
    async fn update(&self, account: AccountRecord) -> Result<(), StoreError>;

    async fn delete(&self, id: AccountId) -> Result<(), StoreError>;

    /// Accounts ordered by id, plus the total count.
    async fn list(&self, page: Page) -> Result<(Vec<AccountRecord>, u64), StoreError>;
}

/// In-memory account store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: RwLock<BTreeMap<AccountId, AccountRecord>>,
    next_id: AtomicU64,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }
}

#[async_trait::async_trait]
impl IdentityStore for InMemoryAccountStore {
    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, StoreError> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        Ok(accounts.get(&id).cloned())
    }
}

#[async_trait::async_trait]
impl AccountRepository for InMemoryAccountStore {
    async fn next_id(&self) -> Result<AccountId, StoreError> {
        Ok(AccountId::new(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn insert(&self, account: AccountRecord) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        if accounts.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!("account {} already exists", account.id)));
        }
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                account.email
            )));
        }
        // Keep the id sequence ahead of explicitly chosen ids.
        self.next_id
            .fetch_max(account.id.get().saturating_add(1), Ordering::Relaxed);
        accounts.insert(account.id, account);
        Ok(())
    }

    async fn update(&self, account: AccountRecord) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        match accounts.get_mut(&account.id) {
            Some(slot) => {
                *slot = account;
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: AccountId) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        accounts.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self, page: Page) -> Result<(Vec<AccountRecord>, u64), StoreError> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        let total = accounts.len() as u64;
        let items = accounts
            .values()
            .skip(page.offset())
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }
}
