use crate::adapters::http::read_json_ok;
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::json;

const CHECKIN_TOKEN: &str = "glados.cloud";

#[derive(Debug, Deserialize)]
struct CheckinResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    points: serde_json::Value,
}

pub struct GladosClient {
    http: Client,
    base_url: String,
}

impl GladosClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteClient for GladosClient {
    type Session = String;

    fn service_name(&self) -> &str {
        "glados"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<String> {
        match credential {
            AccountCredential::Cookie(cookie) => Ok(cookie.clone()),
            other => Err(CheckinError::auth(format!(
                "expected a cookie, got {}",
                other.kind()
            ))),
        }
    }

    async fn checkin(&self, cookie: &String) -> Result<CheckinOutcome> {
        let response = self
            .http
            .post(format!("{}/api/user/checkin", self.base_url))
            .header(header::REFERER, format!("{}/console/checkin", self.base_url))
            .header(header::ORIGIN, &self.base_url)
            .header(header::COOKIE, cookie)
            .json(&json!({ "token": CHECKIN_TOKEN }))
            .send()
            .await?;

        let body: CheckinResponse = read_json_ok(response).await?;

        Ok(if body.message.contains("Checkin! Got") {
            CheckinOutcome::Success(format!("Checked in, got {} points", body.points))
        } else if body.message.contains("Checkin Repeats!") {
            CheckinOutcome::SoftFailure("Already checked in today".to_string())
        } else {
            CheckinOutcome::HardFailure(format!("Check-in rejected: {}", body.message))
        })
    }
}
