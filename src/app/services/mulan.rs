use crate::adapters::http::{json_str, read_json, read_json_ok};
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Mulan grants its daily points when the profile is refreshed after login.
pub struct MulanClient {
    http: Client,
    base_url: String,
}

impl MulanClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RemoteClient for MulanClient {
    /// Bearer access token.
    type Session = String;

    fn service_name(&self) -> &str {
        "mulan"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<String> {
        let AccountCredential::UsernamePassword { username, password } = credential else {
            return Err(CheckinError::auth(format!(
                "expected email:password, got {}",
                credential.kind()
            )));
        };

        let response = self
            .http
            .post(format!("{}/api/auth/sign-in", self.base_url))
            .json(&json!({ "email": username, "password": password }))
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
        ) {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckinError::auth(body));
        }

        let body: Value = read_json_ok(response).await?;
        json_str(&body, "/data/access_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CheckinError::auth(format!("no access token in {}", body)))
    }

    async fn checkin(&self, token: &String) -> Result<CheckinOutcome> {
        let response = self
            .http
            .get(format!("{}/api/user/protected/userinfo/fresh", self.base_url))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(CheckinOutcome::HardFailure("Access token rejected".to_string()));
        }

        let body: Value = read_json(response).await?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        if !data.is_object() {
            return Err(CheckinError::protocol(format!("missing user data: {}", body)));
        }

        let nickname = json_str(&data, "/nickname").unwrap_or_else(|| "unknown".to_string());
        let balance = data.get("balance").cloned().unwrap_or(json!(0));
        let free_balance = data.get("free_balance").cloned().unwrap_or(json!(0));

        Ok(CheckinOutcome::Success(format!(
            "{}: balance {} (free {})",
            nickname, balance, free_balance
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn credential(username: &str) -> AccountCredential {
        AccountCredential::UsernamePassword {
            username: username.into(),
            password: "pw".into(),
        }
    }

    #[tokio::test]
    async fn test_login_then_refresh_profile() {
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/sign-in")
                .json_body(json!({"email": "a@b.c", "password": "pw"}));
            then.status(200)
                .json_body(json!({"data": {"access_token": "tok-1"}}));
        });
        let profile = server.mock(|when, then| {
            when.method(GET)
                .path("/api/user/protected/userinfo/fresh")
                .header("authorization", "Bearer tok-1");
            then.status(200).json_body(json!({
                "data": {"nickname": "Alice", "balance": 120, "free_balance": 20}
            }));
        });

        let client = MulanClient::new(Client::new(), server.base_url());
        let token = client.authenticate(&credential("a@b.c")).await.unwrap();
        assert_eq!(token, "tok-1");

        let outcome = client.checkin(&token).await.unwrap();
        assert_eq!(
            outcome,
            CheckinOutcome::Success("Alice: balance 120 (free 20)".into())
        );
        login.assert();
        profile.assert();
    }

    #[tokio::test]
    async fn test_login_without_token_is_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/sign-in");
            then.status(200).json_body(json!({"code": 1, "msg": "wrong password"}));
        });

        let client = MulanClient::new(Client::new(), server.base_url());
        let err = client.authenticate(&credential("a@b.c")).await.unwrap_err();
        assert!(matches!(err, CheckinError::AuthenticationError { .. }));
    }

    #[tokio::test]
    async fn test_unauthorized_login() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/sign-in");
            then.status(401).body("invalid credentials");
        });

        let client = MulanClient::new(Client::new(), server.base_url());
        let err = client.authenticate(&credential("a@b.c")).await.unwrap_err();
        assert!(err.to_string().contains("invalid credentials"));
    }
}
