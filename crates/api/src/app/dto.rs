use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_auth::{AccountRecord, AuthenticatedIdentity, Page};
use backoffice_core::AccountId;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub users: Vec<AccountRecord>,
    pub meta: PageMeta,
}

impl AccountListResponse {
    pub fn new(users: Vec<AccountRecord>, page: Page, total: u64) -> Self {
        Self {
            users,
            meta: PageMeta {
                page: page.page(),
                limit: page.limit(),
                total,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedAccountResponse {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRecord> for UpdatedAccountResponse {
    fn from(account: AccountRecord) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub identity: AuthenticatedIdentity,
    pub account: AccountRecord,
}
