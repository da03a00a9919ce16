//! Administrator account management.
//!
//! Listing, creation, suspension and restoration are super-admin only; the
//! remaining endpoints are self-service for any admin tier.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use backoffice_auth::NewAccount;
use backoffice_core::AccountId;

use crate::app::dto::{
    AccountListResponse, ListQuery, MessageResponse, UpdateAccountRequest, UpdatedAccountResponse,
};
use crate::app::routes::common::local_actor;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListQuery>,
) -> axum::response::Response {
    let page = query.page();
    match services.list_accounts(page).await {
        Ok((users, total)) => Json(AccountListResponse::new(users, page, total)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<NewAccount>,
) -> axum::response::Response {
    match services.create_admin(body).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.get_own(actor, target).await {
        Ok(account) => Json(account).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<UpdateAccountRequest>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .update_own(
            actor,
            target,
            body.first_name.as_deref(),
            body.last_name.as_deref(),
        )
        .await
    {
        Ok(account) => Json(UpdatedAccountResponse::from(account)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.delete_own(actor, target).await {
        Ok(()) => Json(MessageResponse::new("user deleted successfully")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn suspend_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.suspend(actor, target).await {
        Ok(()) => Json(MessageResponse::new("user suspended successfully")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn restore_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.restore(actor, target).await {
        Ok(()) => Json(MessageResponse::new("user restored successfully")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Lets a peer service check that an admin id from a token is real.
pub async fn verify_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let (actor, target) = match actor_and_target(&principal, &id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.verify_own(actor, target).await {
        Ok(()) => Json(MessageResponse::new("user verified")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn actor_and_target(
    principal: &PrincipalContext,
    raw_id: &str,
) -> Result<(AccountId, AccountId), axum::response::Response> {
    let actor = local_actor(principal)?;
    let target = errors::parse_account_id(raw_id)?;
    Ok((actor, target))
}
