use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::dto::{ChangePasswordRequest, MessageResponse, ProfileResponse};
use crate::app::routes::common::local_actor;
use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let actor = match local_actor(&principal) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };

    match services.get_own(actor, actor).await {
        Ok(account) => Json(ProfileResponse {
            identity: principal.identity(),
            account,
        })
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The one endpoint reachable while a password change is forced.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<ChangePasswordRequest>,
) -> axum::response::Response {
    let actor = match local_actor(&principal) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };

    match services.change_password(actor, &body.password).await {
        Ok(()) => Json(MessageResponse::new("password updated successfully")).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
