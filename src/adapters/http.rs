use crate::utils::error::{CheckinError, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36";

/// One client per run, shared by the vendor client and the notifier.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|e| CheckinError::config(format!("Failed to build HTTP client: {}", e)))
}

/// Reads the body and decodes it as JSON, keeping a snippet of the body on failure.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    tracing::debug!("Response status: {}, {} bytes", status, text.len());

    serde_json::from_str(&text).map_err(|e| {
        CheckinError::protocol(format!(
            "HTTP {} with non-JSON body ({}): {}",
            status,
            e,
            snippet(&text)
        ))
    })
}

/// Like [`read_json`] but rejects non-2xx statuses first.
pub async fn read_json_ok<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(CheckinError::protocol(format!(
            "HTTP {}: {}",
            status,
            snippet(&text)
        )));
    }
    read_json(response).await
}

pub fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    let head: String = text.chars().take(MAX).collect();
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Looks up a string at a JSON pointer, accepting numbers as well.
pub fn json_str(value: &serde_json::Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
