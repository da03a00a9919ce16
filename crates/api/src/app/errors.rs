use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use backoffice_auth::AuthError;
use backoffice_core::{AccountId, DomainError};

use crate::app::services::ServiceError;

pub fn auth_error_to_response(err: &AuthError) -> axum::response::Response {
    let status = match err {
        AuthError::MissingCredential
        | AuthError::InvalidCredential(_)
        | AuthError::Unauthenticated
        | AuthError::Suspended => StatusCode::UNAUTHORIZED,
        AuthError::ForbiddenRole(_)
        | AuthError::Forbidden
        | AuthError::PasswordChangeRequired => StatusCode::FORBIDDEN,
        AuthError::Configuration(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    // Internal details (which secrets exist, store failures) stay in the logs.
    let message = if err.is_internal() {
        "internal server error".to_string()
    } else {
        err.to_string()
    };

    json_error(status, err.code(), message)
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::WeakPassword(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "request failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal server error",
            )
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_state", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_account_id(raw: &str) -> Result<AccountId, axum::response::Response> {
    raw.parse::<AccountId>()
        .map_err(domain_error_to_response)
}
