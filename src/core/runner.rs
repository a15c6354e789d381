use crate::core::{AccountCredential, AccountState, BatchResult, CheckinOutcome, Notifier, RemoteClient};
use std::sync::Arc;
use tracing::Instrument;

/// Runs one service's check-in for every account, strictly one after another.
pub struct BatchRunner<C: RemoteClient> {
    client: C,
    notifier: Arc<dyn Notifier>,
}

impl<C: RemoteClient> BatchRunner<C> {
    pub fn new(client: C, notifier: Arc<dyn Notifier>) -> Self {
        Self { client, notifier }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn run(&self, accounts: &[AccountCredential]) -> BatchResult {
        let span = tracing::info_span!("batch", service = self.client.service_name());

        async {
            let total = accounts.len();
            let mut result = BatchResult::default();
            tracing::info!("🚀 Starting check-in for {} account(s)", total);

            for (idx, credential) in accounts.iter().enumerate() {
                let state = self.run_account(idx + 1, total, credential).await;
                result.record(state);
                tracing::info!("{}", "=".repeat(40));
            }

            tracing::info!("🏁 Check-in finished: {} succeeded", result.summary());
            result
        }
        .instrument(span)
        .await
    }

    /// Drives a single account to a terminal state. Never returns an error:
    /// failures end as `HardFailed` after a notification attempt.
    pub async fn run_account(
        &self,
        index: usize,
        total: usize,
        credential: &AccountCredential,
    ) -> AccountState {
        let label = credential.label();
        let span = tracing::info_span!("account", index, account = %label);

        async {
            let mut state = AccountState::Pending;
            tracing::info!("👤 Account [{}/{}] {}", index, total, label);

            transition(&mut state, AccountState::Authenticating);
            let session = match self.client.authenticate(credential).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!("❌ Login failed: {} (Category: {:?})", e, e.category());
                    self.notify_failure(index, &label, &e.to_string()).await;
                    transition(&mut state, AccountState::HardFailed);
                    return state;
                }
            };

            transition(&mut state, AccountState::CheckingIn);
            match self.client.checkin(&session).await {
                Ok(CheckinOutcome::Success(message)) => {
                    tracing::info!("✅ {}", message);
                    transition(&mut state, AccountState::Succeeded);
                }
                Ok(CheckinOutcome::SoftFailure(message)) => {
                    tracing::info!("ℹ️ {}", message);
                    transition(&mut state, AccountState::SoftFailed);
                }
                Ok(CheckinOutcome::HardFailure(message)) => {
                    tracing::error!("❌ Check-in failed: {}", message);
                    self.notify_failure(index, &label, &message).await;
                    transition(&mut state, AccountState::HardFailed);
                }
                Err(e) => {
                    tracing::error!("❌ Check-in failed: {} (Category: {:?})", e, e.category());
                    tracing::error!("💡 {}", e.recovery_suggestion());
                    self.notify_failure(index, &label, &e.to_string()).await;
                    transition(&mut state, AccountState::HardFailed);
                }
            }
            state
        }
        .instrument(span)
        .await
    }

    async fn notify_failure(&self, index: usize, label: &str, detail: &str) {
        let title = format!("{} check-in failed", self.client.service_name());
        let body = format!("Account {} ({}): {}", index, label, detail);

        if !self.notifier.send(&title, &body).await {
            tracing::warn!("⚠️ Failure notification was not delivered");
        }
    }
}

fn transition(state: &mut AccountState, next: AccountState) {
    tracing::debug!("{:?} -> {:?}", state, next);
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{CheckinError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Behaviour keyed by the cookie value.
    struct ScriptedClient {
        checkins: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn new() -> Self {
            Self {
                checkins: Mutex::new(Vec::new()),
            }
        }

        fn checked_in(&self) -> Vec<String> {
            self.checkins.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteClient for ScriptedClient {
        type Session = String;

        fn service_name(&self) -> &str {
            "scripted"
        }

        async fn authenticate(&self, credential: &AccountCredential) -> Result<String> {
            match credential {
                AccountCredential::Cookie(c) if c == "bad-login" => {
                    Err(CheckinError::auth("invalid password"))
                }
                AccountCredential::Cookie(c) => Ok(c.clone()),
                _ => Err(CheckinError::auth("unsupported credential")),
            }
        }

        async fn checkin(&self, session: &String) -> Result<CheckinOutcome> {
            self.checkins.lock().unwrap().push(session.clone());
            match session.as_str() {
                "network" => Err(CheckinError::protocol("connection reset")),
                "repeat" => Ok(CheckinOutcome::SoftFailure("already checked in".into())),
                "expired" => Ok(CheckinOutcome::HardFailure("cookie expired".into())),
                _ => Ok(CheckinOutcome::Success("+1 point".into())),
            }
        }
    }

    struct CountingNotifier {
        sent: AtomicUsize,
        deliver: bool,
        bodies: Mutex<Vec<String>>,
    }

    impl CountingNotifier {
        fn new(deliver: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: AtomicUsize::new(0),
                deliver,
                bodies: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send(&self, title: &str, body: &str) -> bool {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.bodies.lock().unwrap().push(format!("{title}|{body}"));
            self.deliver
        }
    }

    fn cookies(values: &[&str]) -> Vec<AccountCredential> {
        values
            .iter()
            .map(|v| AccountCredential::Cookie(v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_account() {
        let notifier = CountingNotifier::new(true);
        let runner = BatchRunner::new(ScriptedClient::new(), notifier.clone());

        let result = runner.run(&cookies(&["network", "good"])).await;

        assert_eq!(result, BatchResult { total: 2, succeeded: 1 });
        assert_eq!(result.summary(), "1/2");
        assert_eq!(runner.client().checked_in(), vec!["network", "good"]);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_soft_failure_is_not_notified_or_counted() {
        let notifier = CountingNotifier::new(true);
        let runner = BatchRunner::new(ScriptedClient::new(), notifier.clone());

        let state = runner.run_account(1, 1, &AccountCredential::Cookie("repeat".into())).await;

        assert_eq!(state, AccountState::SoftFailed);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);

        let result = runner.run(&cookies(&["repeat", "good"])).await;
        assert_eq!(result.summary(), "1/2");
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_undelivered_notification_does_not_escalate() {
        let notifier = CountingNotifier::new(false);
        let runner = BatchRunner::new(ScriptedClient::new(), notifier.clone());

        let state = runner.run_account(1, 2, &AccountCredential::Cookie("expired".into())).await;
        assert_eq!(state, AccountState::HardFailed);

        let next = runner.run_account(2, 2, &AccountCredential::Cookie("good".into())).await;
        assert_eq!(next, AccountState::Succeeded);
        assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_failure_skips_checkin_and_notifies_once() {
        let notifier = CountingNotifier::new(true);
        let runner = BatchRunner::new(ScriptedClient::new(), notifier.clone());

        let state = runner
            .run_account(3, 3, &AccountCredential::Cookie("bad-login".into()))
            .await;

        assert_eq!(state, AccountState::HardFailed);
        assert!(runner.client().checked_in().is_empty());

        let bodies = notifier.bodies.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert!(bodies[0].starts_with("scripted check-in failed|Account 3 (b***)"));
        assert!(bodies[0].contains("invalid password"));
    }

    #[tokio::test]
    async fn test_empty_account_list() {
        let runner = BatchRunner::new(ScriptedClient::new(), CountingNotifier::new(true));
        let result = runner.run(&[]).await;
        assert_eq!(result.summary(), "0/0");
    }
}
