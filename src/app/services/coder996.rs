use crate::adapters::http::{json_str, read_json, snippet};
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct NewApiSession {
    /// `session=<value>`, ready for the Cookie header.
    pub cookie: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// 996coder runs a new-api deployment: session cookie plus `new-api-user` header.
pub struct Coder996Client {
    http: Client,
    base_url: String,
}

impl Coder996Client {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteClient for Coder996Client {
    type Session = NewApiSession;

    fn service_name(&self) -> &str {
        "996coder"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<NewApiSession> {
        let AccountCredential::UsernamePassword { username, password } = credential else {
            return Err(CheckinError::auth(format!(
                "expected user:password, got {}",
                credential.kind()
            )));
        };

        let response = self
            .http
            .post(format!("{}/api/user/login", self.base_url))
            .query(&[("turnstile", "")])
            .header(header::ORIGIN, &self.base_url)
            .header(header::REFERER, format!("{}/login", self.base_url))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        let session_cookie = response
            .cookies()
            .find(|c| c.name() == "session")
            .map(|c| format!("session={}", c.value()));

        let body: ApiResponse = read_json(response).await?;
        if !body.success {
            return Err(CheckinError::auth(body.message));
        }

        let cookie = session_cookie
            .ok_or_else(|| CheckinError::auth("login succeeded but no session cookie was set"))?;
        let user_id = json_str(&body.data, "/id")
            .ok_or_else(|| CheckinError::protocol("login response has no user id"))?;

        Ok(NewApiSession { cookie, user_id })
    }

    async fn checkin(&self, session: &NewApiSession) -> Result<CheckinOutcome> {
        let response = self
            .http
            .post(format!("{}/api/user/checkin", self.base_url))
            .header(header::ORIGIN, &self.base_url)
            .header(header::REFERER, format!("{}/console/personal", self.base_url))
            .header(header::COOKIE, &session.cookie)
            .header("new-api-user", &session.user_id)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: ApiResponse = serde_json::from_str(&text).map_err(|_| {
            CheckinError::protocol(format!("HTTP {}: {}", status, snippet(&text)))
        })?;

        Ok(if !status.is_success() {
            CheckinOutcome::HardFailure(format!("HTTP {}: {}", status, body.message))
        } else if body.success {
            CheckinOutcome::Success(body.message)
        } else {
            CheckinOutcome::SoftFailure(body.message)
        })
    }
}
