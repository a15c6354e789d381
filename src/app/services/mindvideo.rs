use crate::adapters::http::{json_str, read_json};
use crate::core::signing::{md5_hex, nonce_signature_header};
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

const CLIENT_LANG: &str = "zh-CN";
const CLIENT_VERSION: &str = "1.0.8";

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: Option<i64>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

/// MindVideo signs every request with an `i-sign` nonce header and expects
/// the password already MD5-hashed.
pub struct MindVideoClient {
    http: Client,
    base_url: String,
}

impl MindVideoClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn signed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("i-sign", nonce_signature_header())
            .header("i-lang", CLIENT_LANG)
            .header("i-version", CLIENT_VERSION)
    }
}

#[async_trait]
impl RemoteClient for MindVideoClient {
    type Session = String;

    fn service_name(&self) -> &str {
        "mindvideo"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<String> {
        let AccountCredential::UsernamePassword { username, password } = credential else {
            return Err(CheckinError::auth(format!(
                "expected email:password, got {}",
                credential.kind()
            )));
        };

        let request = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&json!({ "email": username, "password": md5_hex(password) }));
        let body: ApiResponse = read_json(self.signed(request).send().await?).await?;

        if body.code != Some(0) {
            return Err(CheckinError::auth(body.message));
        }
        json_str(&body.data, "/access_token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CheckinError::protocol("login succeeded but no access token returned"))
    }

    async fn checkin(&self, token: &String) -> Result<CheckinOutcome> {
        let request = self
            .http
            .post(format!("{}/checkin", self.base_url))
            .bearer_auth(token);
        let body: ApiResponse = read_json(self.signed(request).send().await?).await?;

        Ok(match body.code {
            Some(0) if body.message.is_empty() => CheckinOutcome::Success("Checked in".to_string()),
            Some(0) => CheckinOutcome::Success(body.message),
            Some(_) => CheckinOutcome::SoftFailure(body.message),
            None => return Err(CheckinError::protocol("check-in response has no code")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_login_hashes_password_and_signs() {
        let server = MockServer::start();
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/login")
                .header_exists("i-sign")
                .header("i-version", "1.0.8")
                .json_body(json!({
                    "email": "a@b.c",
                    "password": "2ab96390c7dbe3439de74d0c9b0b1767"
                }));
            then.status(200)
                .json_body(json!({"code": 0, "data": {"access_token": "mv-token"}}));
        });

        let client = MindVideoClient::new(Client::new(), server.base_url());
        let token = client
            .authenticate(&AccountCredential::UsernamePassword {
                username: "a@b.c".into(),
                password: "hunter2".into(),
            })
            .await
            .unwrap();

        assert_eq!(token, "mv-token");
        login.assert();
    }

    #[tokio::test]
    async fn test_rejected_login() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/login");
            then.status(200).json_body(json!({"code": 1001, "message": "密码错误"}));
        });

        let client = MindVideoClient::new(Client::new(), server.base_url());
        let err = client
            .authenticate(&AccountCredential::UsernamePassword {
                username: "a@b.c".into(),
                password: "x".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, CheckinError::AuthenticationError { .. }));
        assert!(err.to_string().contains("密码错误"));
    }

    #[tokio::test]
    async fn test_checkin_codes() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/checkin")
                .header("authorization", "Bearer fresh");
            then.status(200).json_body(json!({"code": 0, "message": "签到成功"}));
        });
        server.mock(|when, then| {
            when.method(POST)
                .path("/checkin")
                .header("authorization", "Bearer done");
            then.status(200).json_body(json!({"code": 40001, "message": "今日已签到"}));
        });

        let client = MindVideoClient::new(Client::new(), server.base_url());
        assert_eq!(
            client.checkin(&"fresh".to_string()).await.unwrap(),
            CheckinOutcome::Success("签到成功".into())
        );
        assert_eq!(
            client.checkin(&"done".to_string()).await.unwrap(),
            CheckinOutcome::SoftFailure("今日已签到".into())
        );
    }
}
