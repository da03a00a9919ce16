use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, middleware::Next, response::Response};

use backoffice_auth::{AuthError, GuardChain, GuardPolicy};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Per-route-group guard: the shared chain plus the policy of the group.
#[derive(Clone)]
pub struct AuthState {
    pub guard: Arc<GuardChain>,
    pub policy: Arc<GuardPolicy>,
}

impl AuthState {
    pub fn new(guard: Arc<GuardChain>, policy: GuardPolicy) -> Self {
        Self {
            guard,
            policy: Arc::new(policy),
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = extract_bearer(req.headers()).map(str::to_owned);

    match state.guard.authorize(&state.policy, token.as_deref()).await {
        Ok(identity) => {
            req.extensions_mut().insert(PrincipalContext::new(identity));
            next.run(req).await
        }
        Err(err) => {
            log_rejection(&state.policy, req.uri().path(), &err);
            errors::auth_error_to_response(&err)
        }
    }
}

fn log_rejection(policy: &GuardPolicy, path: &str, err: &AuthError) {
    if err.is_internal() {
        tracing::error!(%path, allowed = %policy.allowed(), error = %err, "authorization failed");
    } else {
        tracing::info!(%path, allowed = %policy.allowed(), code = err.code(), "request rejected");
    }
}

/// Token from `Authorization: Bearer <token>`. Any other shape counts as no
/// credential at all.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;

    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer(&headers("bearer  abc ")), Some("abc"));
    }

    #[test]
    fn other_shapes_are_no_credential() {
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
        assert_eq!(extract_bearer(&headers("Bearer")), None);
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer(&headers("abc.def.ghi")), None);
    }
}
