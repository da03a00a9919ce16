use axum::{extract::Extension, Json};

use backoffice_auth::AuthenticatedIdentity;

use crate::context::PrincipalContext;

/// Echo the identity a peer service's token resolved to.
pub async fn whoami(
    Extension(principal): Extension<PrincipalContext>,
) -> Json<AuthenticatedIdentity> {
    Json(principal.identity())
}
