use crate::adapters::http::read_json;
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::{json, Value};

const WEBSITE_DOMAIN: &str = "ai.sparkaigf.com";
const FINGERPRINT: &str = "1058487584";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignLogEntry {
    #[serde(default)]
    pub is_signed: bool,
    #[serde(default)]
    pub sign_date: Option<String>,
}

/// Newest day first.
pub fn is_today_signed(log: &[SignLogEntry]) -> bool {
    log.first().map(|e| e.is_signed).unwrap_or(false)
}

pub fn count_signed_days(log: &[SignLogEntry]) -> usize {
    log.iter().filter(|e| e.is_signed).count()
}

pub struct SparkAiClient {
    http: Client,
    base_url: String,
}

impl SparkAiClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Website-Domain", WEBSITE_DOMAIN)
            .header("Fingerprint", FINGERPRINT)
    }

    pub async fn sign_log(&self, token: &str) -> Result<Vec<SignLogEntry>> {
        let response = self
            .request(reqwest::Method::GET, "/signin/signinLog")
            .bearer_auth(token)
            .send()
            .await?;
        let body: ApiResponse<Vec<SignLogEntry>> = read_json(response).await?;

        if body.code != 200 {
            return Err(CheckinError::protocol(format!(
                "sign log unavailable: {}",
                body.message.unwrap_or_default()
            )));
        }
        Ok(body.data.unwrap_or_default())
    }
}

#[async_trait]
impl RemoteClient for SparkAiClient {
    type Session = String;

    fn service_name(&self) -> &str {
        "sparkai"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<String> {
        let AccountCredential::UsernamePassword { username, password } = credential else {
            return Err(CheckinError::auth(format!(
                "expected username:password, got {}",
                credential.kind()
            )));
        };

        let response = self
            .request(reqwest::Method::POST, "/auth/login")
            .header(header::REFERER, format!("https://{}/chatai", WEBSITE_DOMAIN))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let body: ApiResponse<Value> = read_json(response).await?;

        if body.code != 200 {
            return Err(CheckinError::auth(body.message.unwrap_or_default()));
        }
        body.data
            .as_ref()
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| CheckinError::protocol("login succeeded but no token returned"))
    }

    async fn checkin(&self, token: &String) -> Result<CheckinOutcome> {
        let log = self.sign_log(token).await?;
        if is_today_signed(&log) {
            return Ok(CheckinOutcome::SoftFailure(format!(
                "Already signed today, {} day(s) this month",
                count_signed_days(&log)
            )));
        }

        let response = self
            .request(reqwest::Method::POST, "/signin/sign")
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await?;
        let body: ApiResponse<Value> = read_json(response).await?;

        if body.code != 200 {
            return Ok(CheckinOutcome::SoftFailure(
                body.message.unwrap_or_else(|| "Check-in refused".to_string()),
            ));
        }

        let message = match body.data {
            Some(Value::String(s)) => s,
            _ => "Checked in".to_string(),
        };
        let days = count_signed_days(&self.sign_log(token).await?);
        Ok(CheckinOutcome::Success(format!(
            "{}, {} day(s) this month",
            message, days
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(signed: bool) -> SignLogEntry {
        SignLogEntry {
            is_signed: signed,
            sign_date: None,
        }
    }

    #[test]
    fn test_sign_log_helpers() {
        let log = vec![entry(true), entry(false), entry(true)];
        assert!(is_today_signed(&log));
        assert_eq!(count_signed_days(&log), 2);

        assert!(!is_today_signed(&[]));
        assert!(!is_today_signed(&[entry(false), entry(true)]));
    }

    #[test]
    fn test_sign_log_deserializes_camel_case() {
        let parsed: Vec<SignLogEntry> = serde_json::from_value(json!([
            {"signDate": "2026-10-18", "isSigned": true},
            {"signDate": "2026-10-17"}
        ]))
        .unwrap();

        assert!(parsed[0].is_signed);
        assert!(!parsed[1].is_signed);
        assert_eq!(parsed[0].sign_date.as_deref(), Some("2026-10-18"));
    }

    #[tokio::test]
    async fn test_already_signed_does_not_sign_again() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/signin/signinLog")
                .header("fingerprint", FINGERPRINT);
            then.status(200).json_body(json!({
                "code": 200,
                "data": [{"isSigned": true}, {"isSigned": true}, {"isSigned": false}]
            }));
        });
        let sign = server.mock(|when, then| {
            when.method(POST).path("/signin/sign");
            then.status(200).json_body(json!({"code": 200, "data": "ok"}));
        });

        let client = SparkAiClient::new(Client::new(), server.base_url());
        let outcome = client.checkin(&"tok".to_string()).await.unwrap();

        assert_eq!(
            outcome,
            CheckinOutcome::SoftFailure("Already signed today, 2 day(s) this month".into())
        );
        assert_eq!(sign.hits(), 0);
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .header("x-website-domain", WEBSITE_DOMAIN)
                .json_body(json!({"username": "u", "password": "p"}));
            then.status(200).json_body(json!({"code": 200, "data": "spark-token"}));
        });

        let client = SparkAiClient::new(Client::new(), server.base_url());
        let token = client
            .authenticate(&AccountCredential::UsernamePassword {
                username: "u".into(),
                password: "p".into(),
            })
            .await
            .unwrap();
        assert_eq!(token, "spark-token");
    }
}
