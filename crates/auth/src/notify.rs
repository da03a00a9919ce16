//! Delivery of credentials to newly provisioned accounts.

use thiserror::Error;

/// Credentials for a freshly created account.
#[derive(Clone)]
pub struct CredentialDelivery {
    pub to: String,
    pub full_name: String,
    pub temporary_password: String,
}

impl core::fmt::Debug for CredentialDelivery {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialDelivery")
            .field("to", &self.to)
            .field("full_name", &self.full_name)
            .field("temporary_password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("credential delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound channel for account credentials (email in production).
#[async_trait::async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn send_credentials(&self, delivery: CredentialDelivery) -> Result<(), NotifyError>;
}

/// Records deliveries in the log instead of sending them. The password itself
/// is never logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl CredentialNotifier for LogNotifier {
    async fn send_credentials(&self, delivery: CredentialDelivery) -> Result<(), NotifyError> {
        tracing::info!(to = %delivery.to, name = %delivery.full_name, "account credentials issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_the_password() {
        let delivery = CredentialDelivery {
            to: "a@example.com".to_string(),
            full_name: "Doe Jane".to_string(),
            temporary_password: "s3cr3t-value".to_string(),
        };
        let rendered = format!("{delivery:?}");
        assert!(!rendered.contains("s3cr3t-value"));
        assert!(rendered.contains("a@example.com"));
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let delivery = CredentialDelivery {
            to: "a@example.com".to_string(),
            full_name: "Doe Jane".to_string(),
            temporary_password: "x".to_string(),
        };
        assert!(LogNotifier.send_credentials(delivery).await.is_ok());
    }
}
