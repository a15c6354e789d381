use crate::core::Notifier;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub const XIZHI_BASE_URL: &str = "https://xizhi.qqoq.net";
/// Applied per request, independent of the vendor timeout on the shared client.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Push notifications through the xizhi webhook: `GET {base}/{key}.send?title=..&content=..`.
pub struct XizhiNotifier {
    client: Client,
    base_url: String,
    key: String,
    timeout: Duration,
}

impl XizhiNotifier {
    pub fn new(client: Client, base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            timeout: NOTIFY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn send_url(&self) -> String {
        format!("{}/{}.send", self.base_url, self.key)
    }
}

#[async_trait]
impl Notifier for XizhiNotifier {
    async fn send(&self, title: &str, body: &str) -> bool {
        let result = self
            .client
            .get(self.send_url())
            .query(&[("title", title), ("content", body)])
            .timeout(self.timeout)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => {
                tracing::info!("📨 Notification sent: {}", title);
                true
            }
            Err(e) => {
                tracing::error!("❌ Failed to send notification: {}", e);
                false
            }
        }
    }
}

/// Stand-in when no webhook key is configured.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, title: &str, _body: &str) -> bool {
        tracing::warn!("🔕 Notifications disabled, dropping: {}", title);
        false
    }
}
