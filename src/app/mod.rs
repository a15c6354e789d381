pub mod services;

use crate::adapters::http::build_client;
use crate::adapters::notify::{NoopNotifier, XizhiNotifier};
use crate::config::service::ServiceKind;
use crate::config::Settings;
use crate::core::runner::BatchRunner;
use crate::core::{AccountCredential, BatchResult, Notifier, RemoteClient};
use crate::utils::error::Result;
use reqwest::Client;
use services::*;
use std::sync::Arc;

fn build_notifier(http: &Client, settings: &Settings) -> Arc<dyn Notifier> {
    match &settings.notify.key {
        Some(key) => Arc::new(XizhiNotifier::new(
            http.clone(),
            settings.notify.base_url.clone(),
            key.clone(),
        )),
        None => {
            tracing::warn!("🔕 No notification key configured, failures will only be logged");
            Arc::new(NoopNotifier)
        }
    }
}

async fn run_with<C: RemoteClient>(
    client: C,
    notifier: Arc<dyn Notifier>,
    accounts: &[AccountCredential],
) -> BatchResult {
    BatchRunner::new(client, notifier).run(accounts).await
}

/// Runs one batch for the configured service.
///
/// Only configuration problems come back as `Err`; per-account failures are
/// folded into the returned [`BatchResult`].
pub async fn run(settings: &Settings) -> Result<BatchResult> {
    let accounts = settings
        .service
        .account_source()
        .parse(&settings.accounts_source, settings.accounts_raw.as_deref())?;

    // 所有請求共用同一個 HTTP 客戶端
    let http = build_client(settings.timeout)?;
    let notifier = build_notifier(&http, settings);
    let base = settings.base_url.clone();

    let result = match settings.service {
        ServiceKind::Glados => run_with(GladosClient::new(http, base), notifier, &accounts).await,
        ServiceKind::Mulan => run_with(MulanClient::new(http, base), notifier, &accounts).await,
        ServiceKind::Coder996 => {
            run_with(Coder996Client::new(http, base), notifier, &accounts).await
        }
        ServiceKind::Music163 => {
            run_with(Music163Client::new(http, base), notifier, &accounts).await
        }
        ServiceKind::Mindvideo => {
            run_with(MindVideoClient::new(http, base), notifier, &accounts).await
        }
        ServiceKind::Sparkai => {
            run_with(SparkAiClient::new(http, base), notifier, &accounts).await
        }
        ServiceKind::Maidanba => {
            run_with(MaidanbaClient::new(http, base), notifier, &accounts).await
        }
        ServiceKind::Smzdm => run_with(SmzdmClient::new(http, base), notifier, &accounts).await,
        ServiceKind::Bilibili => {
            let client = BilibiliClient::new(http, base, settings.bilibili.clone());
            run_with(client, notifier, &accounts).await
        }
    };

    Ok(result)
}
