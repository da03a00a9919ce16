use axum::http::StatusCode;
use axum::response::Response;

use backoffice_core::AccountId;

use crate::app::errors;
use crate::context::PrincipalContext;

/// The caller's own account. Admin route groups only admit local roles, so a
/// missing account id means the route was mounted under the wrong guard.
pub fn local_actor(principal: &PrincipalContext) -> Result<AccountId, Response> {
    principal.account_id().ok_or_else(|| {
        tracing::error!(role = %principal.role(), "remote principal reached an admin route");
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden")
    })
}
