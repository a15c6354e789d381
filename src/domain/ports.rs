use crate::domain::model::{AccountCredential, CheckinOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One external service that can log an account in and perform its daily check-in.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    type Session: Send + Sync;

    /// Human readable service name used in logs and notification titles.
    fn service_name(&self) -> &str;

    async fn authenticate(&self, credential: &AccountCredential) -> Result<Self::Session>;

    /// Business outcomes come back as `Ok`; only transport or parse problems are `Err`.
    async fn checkin(&self, session: &Self::Session) -> Result<CheckinOutcome>;
}

/// Best-effort push notification. Implementations never fail outward.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> bool;
}
