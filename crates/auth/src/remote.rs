//! Confirmation of remote-role subjects with their owning service.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use backoffice_core::SubjectId;

use crate::secrets::RemoteEndpoint;

/// Asks the service that owns a remote role whether a subject is currently
/// valid for it.
///
/// Any outcome other than an explicit confirmation is `false`; there is no
/// retry at this layer.
#[async_trait::async_trait]
pub trait RemoteRoleVerifier: Send + Sync {
    async fn confirm(&self, endpoint: &RemoteEndpoint, subject_id: SubjectId, token: &str) -> bool;
}

/// HTTP implementation: `GET {endpoint}/verify/{subject_id}` with the caller's
/// bearer token forwarded. Only `200 OK` confirms.
#[derive(Debug, Clone)]
pub struct HttpRoleVerifier {
    client: Client,
}

impl HttpRoleVerifier {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Build a verifier whose calls time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl RemoteRoleVerifier for HttpRoleVerifier {
    async fn confirm(&self, endpoint: &RemoteEndpoint, subject_id: SubjectId, token: &str) -> bool {
        let url = endpoint.verify_url(subject_id);

        match self.client.get(&url).bearer_auth(token).send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                tracing::debug!(%url, status = %response.status(), "remote verification refused");
                false
            }
            Err(e) => {
                tracing::warn!(%url, timeout = e.is_timeout(), error = %e, "remote verification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        extract::Path,
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::get,
    };

    use super::*;

    async fn verify(Path(id): Path<u64>, headers: HeaderMap) -> AxumStatus {
        let bearer = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        match (id, bearer) {
            (7, Some("Bearer good-token")) => AxumStatus::OK,
            (7, _) => AxumStatus::UNAUTHORIZED,
            (99, _) => {
                tokio::time::sleep(Duration::from_millis(500)).await;
                AxumStatus::OK
            }
            _ => AxumStatus::NOT_FOUND,
        }
    }

    async fn spawn_owner() -> (RemoteEndpoint, tokio::task::JoinHandle<()>) {
        let app = Router::new().route("/users/verify/:id", get(verify));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let endpoint = RemoteEndpoint::parse(&format!("http://{addr}/users")).unwrap();
        (endpoint, handle)
    }

    #[tokio::test]
    async fn ok_response_confirms_and_forwards_token() {
        let (endpoint, handle) = spawn_owner().await;
        let verifier = HttpRoleVerifier::new(HttpRoleVerifier::DEFAULT_TIMEOUT).unwrap();

        assert!(verifier.confirm(&endpoint, SubjectId::new(7), "good-token").await);
        assert!(!verifier.confirm(&endpoint, SubjectId::new(7), "other-token").await);
        handle.abort();
    }

    #[tokio::test]
    async fn non_success_is_not_confirmed() {
        let (endpoint, handle) = spawn_owner().await;
        let verifier = HttpRoleVerifier::new(HttpRoleVerifier::DEFAULT_TIMEOUT).unwrap();

        assert!(!verifier.confirm(&endpoint, SubjectId::new(8), "good-token").await);
        handle.abort();
    }

    #[tokio::test]
    async fn timeout_is_not_confirmed() {
        let (endpoint, handle) = spawn_owner().await;
        let verifier = HttpRoleVerifier::new(Duration::from_millis(50)).unwrap();

        assert!(!verifier.confirm(&endpoint, SubjectId::new(99), "good-token").await);
        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_service_is_not_confirmed() {
        let endpoint = RemoteEndpoint::parse("http://127.0.0.1:9/users").unwrap();
        let verifier = HttpRoleVerifier::new(Duration::from_millis(200)).unwrap();

        assert!(!verifier.confirm(&endpoint, SubjectId::new(1), "t").await);
    }
}
