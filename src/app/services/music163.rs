use crate::adapters::http::read_json_ok;
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Mobile,
    Desktop,
}

impl Platform {
    fn task_type(self) -> &'static str {
        match self {
            Self::Mobile => "0",
            Self::Desktop => "1",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TaskResult {
    Gained(i64),
    Repeat,
    CookieExpired(String),
}

/// NetEase Cloud Music: one daily task per platform, both driven by the same cookie.
pub struct Music163Client {
    http: Client,
    base_url: String,
}

impl Music163Client {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn daily_task(&self, cookie: &str, platform: Platform) -> Result<TaskResult> {
        let response = self
            .http
            .get(format!("{}/api/point/dailyTask", self.base_url))
            .query(&[("type", platform.task_type())])
            .header(header::COOKIE, cookie)
            .send()
            .await?;

        let body: Value = read_json_ok(response).await?;
        let raw = body.to_string();

        Ok(if raw.contains("重复") {
            TaskResult::Repeat
        } else if let Some(point) = body.get("point").and_then(Value::as_i64) {
            TaskResult::Gained(point)
        } else {
            TaskResult::CookieExpired(raw)
        })
    }
}

#[async_trait]
impl RemoteClient for Music163Client {
    type Session = String;

    fn service_name(&self) -> &str {
        "music163"
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
        let mut parts = Vec::new();
        let mut gained = false;

        for platform in [Platform::Mobile, Platform::Desktop] {
            match self.daily_task(cookie, platform).await? {
                TaskResult::Gained(point) => {
                    gained = true;
                    parts.push(format!("{}: +{} points", platform.label(), point));
                }
                TaskResult::Repeat => parts.push(format!("{}: already done", platform.label())),
                TaskResult::CookieExpired(body) => {
                    return Ok(CheckinOutcome::HardFailure(format!(
                        "{} check-in rejected, cookie expired? {}",
                        platform.label(),
                        body
                    )));
                }
            }
        }

        let summary = parts.join(", ");
        Ok(if gained {
            CheckinOutcome::Success(summary)
        } else {
            CheckinOutcome::SoftFailure(summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_both_platforms() {
        let server = MockServer::start();
        let mobile = server.mock(|when, then| {
            when.method(GET)
                .path("/api/point/dailyTask")
                .query_param("type", "0")
                .header("cookie", "MUSIC_U=x");
            then.status(200).json_body(json!({"point": 3, "code": 200}));
        });
        let desktop = server.mock(|when, then| {
            when.method(GET)
                .path("/api/point/dailyTask")
                .query_param("type", "1");
            then.status(200).json_body(json!({"code": -2, "msg": "重复签到"}));
        });

        let client = Music163Client::new(Client::new(), server.base_url());
        let outcome = client.checkin(&"MUSIC_U=x".to_string()).await.unwrap();

        assert_eq!(
            outcome,
            CheckinOutcome::Success("mobile: +3 points, desktop: already done".into())
        );
        mobile.assert();
        desktop.assert();
    }

    #[tokio::test]
    async fn test_repeat_on_both_is_soft_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/point/dailyTask");
            then.status(200).json_body(json!({"code": -2, "msg": "重复签到"}));
        });

        let client = Music163Client::new(Client::new(), server.base_url());
        let outcome = client.checkin(&"MUSIC_U=x".to_string()).await.unwrap();
        assert!(matches!(outcome, CheckinOutcome::SoftFailure(_)));
    }

    #[tokio::test]
    async fn test_expired_cookie_stops_early() {
        let server = MockServer::start();
        let mobile = server.mock(|when, then| {
            when.method(GET)
                .path("/api/point/dailyTask")
                .query_param("type", "0");
            then.status(200).json_body(json!({"code": 301, "msg": "需要登录"}));
        });
        let desktop = server.mock(|when, then| {
            when.method(GET)
                .path("/api/point/dailyTask")
                .query_param("type", "1");
            then.status(200).json_body(json!({"point": 2, "code": 200}));
        });

        let client = Music163Client::new(Client::new(), server.base_url());
        let outcome = client.checkin(&"bad".to_string()).await.unwrap();

        assert!(matches!(outcome, CheckinOutcome::HardFailure(_)));
        mobile.assert();
        assert_eq!(desktop.hits(), 0);
    }
}
