use crate::adapters::http::read_json_ok;
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const RETURN_OK: &str = "000000";
const TASK_SHOW_CD: &str = "00";
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 18_7_1 like Mac OS X) AppleWebKit/537.36 (KHTML, like Gecko) Mobile/15E148 BoComMDB";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignPayload<'a> {
    task_show_cd: &'a str,
    task_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    return_code: String,
    #[serde(default)]
    return_msg: String,
    #[serde(default)]
    data: Value,
}

/// Fields arrive as strings or numbers depending on the backend build.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignData {
    #[serde(default)]
    task_id: Option<Value>,
    #[serde(default)]
    sign_sts: Option<Value>,
    #[serde(default)]
    total_days: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct MaidanbaSession {
    pub cookie: String,
    pub token: String,
    pub task_id: String,
    pub signed: bool,
    pub total_days: String,
}

/// Bank of Communications credit-card app (买单吧).
pub struct MaidanbaClient {
    http: Client,
    base_url: String,
}

impl MaidanbaClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn post(&self, path: &str, cookie: &str, token: &str, task_id: &str) -> Result<ApiResponse> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .query(&[("token", token)])
            .header(header::USER_AGENT, MOBILE_USER_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(header::COOKIE, cookie)
            .json(&SignPayload {
                task_show_cd: TASK_SHOW_CD,
                task_id,
            })
            .send()
            .await?;
        read_json_ok(response).await
    }

    async fn sign_data(&self, cookie: &str, token: &str, task_id: &str) -> Result<SignData> {
        let body = self.post("/sign/data", cookie, token, task_id).await?;
        if body.return_code != RETURN_OK {
            return Err(CheckinError::auth(format!(
                "sign data rejected ({}): {}",
                body.return_code, body.return_msg
            )));
        }
        match body.data {
            Value::Null => Ok(SignData::default()),
            data => serde_json::from_value(data)
                .map_err(|e| CheckinError::auth(format!("unreadable sign data: {}", e))),
        }
    }
}

fn value_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn days_label(value: Option<Value>) -> String {
    value_text(value).unwrap_or_else(|| "0".to_string())
}

#[async_trait]
impl RemoteClient for MaidanbaClient {
    type Session = MaidanbaSession;

    fn service_name(&self) -> &str {
        "maidanba"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<MaidanbaSession> {
        let AccountCredential::CookieToken { cookie, token } = credential else {
            return Err(CheckinError::auth(format!(
                "expected cookie#token, got {}",
                credential.kind()
            )));
        };

        let data = self.sign_data(cookie, token, "").await?;
        Ok(MaidanbaSession {
            cookie: cookie.clone(),
            token: token.clone(),
            task_id: value_text(data.task_id).unwrap_or_default(),
            signed: value_text(data.sign_sts).as_deref() == Some("1"),
            total_days: days_label(data.total_days),
        })
    }

    async fn checkin(&self, session: &MaidanbaSession) -> Result<CheckinOutcome> {
        if session.signed {
            return Ok(CheckinOutcome::SoftFailure(format!(
                "Already signed today, {} day(s) in total",
                session.total_days
            )));
        }

        let body = self
            .post("/sign/sign", &session.cookie, &session.token, &session.task_id)
            .await?;
        if body.return_code != RETURN_OK {
            let message = if body.return_msg.is_empty() {
                format!("returnCode {}", body.return_code)
            } else {
                body.return_msg
            };
            return Ok(CheckinOutcome::HardFailure(message));
        }

        let points = body.data.get("itgBal").cloned().unwrap_or(Value::from(0));
        let refreshed = self
            .sign_data(&session.cookie, &session.token, &session.task_id)
            .await?;

        Ok(CheckinOutcome::Success(format!(
            "Got {} points, {} day(s) in total",
            points,
            days_label(refreshed.total_days)
        )))
    }
}
