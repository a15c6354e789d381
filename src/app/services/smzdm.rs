use crate::adapters::http::{json_str, read_json_ok};
use crate::core::signing::{sign_fields, timestamp_millis};
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::{header, Client};
use serde_json::Value;

pub const USER_API_BASE_URL: &str = "https://user-api.smzdm.com";
pub const PROFILE_BASE_URL: &str = "https://zhiyou.smzdm.com";

const SIGN_KEY: &str = "apr1$AwP!wRRT$gJ/q.X24poeBInlUJC";
const CHECKIN_SK: &str = "ierkM0OZZbsuBKLoAgQ6OJneLMXBQXmzX+LXkNTuKch8Ui2jGlahuFyWIzBiDq/L";
const PLATFORM: &str = "android";
const APP_VERSION: &str = "10.4.1";
const APP_USER_AGENT: &str = "smzdm_android_V10.4.1 rv:841 (22021211RC;Android12;zh)smzdmapp";
const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmzdmProfile {
    pub name: String,
    pub level: String,
    pub gold: String,
    pub silver: String,
}

#[derive(Debug, Clone)]
pub struct SmzdmSession {
    pub cookie: String,
    pub token: String,
    pub profile: SmzdmProfile,
}

fn first_capture(html: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn asset_value(raw: Option<String>) -> String {
    raw.map(|v| {
        v.replace(r#"<span class="assets-part-element assets-num">"#, "")
            .replace('\'', "")
            .trim()
            .to_string()
    })
    .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Scrapes nickname, level and balances off the mobile profile page.
pub fn parse_profile(html: &str) -> SmzdmProfile {
    let name = first_capture(html, r#"(?s)<a href="https://zhiyou.smzdm.com/user"> (.*?) </a>"#);
    let level = first_capture(
        html,
        r#"(?s)<img src="https://res.smzdm.com/h5/h5_user/dist/assets/level/(.*?)\.png\?v=1">"#,
    );
    let gold = first_capture(html, r#"(?s)<div class="assets-part assets-gold">\s+(.*?)</span>"#);
    let silver = first_capture(
        html,
        r#"(?s)<div class="assets-part assets-prestige">\s+(.*?)</span>"#,
    );

    SmzdmProfile {
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
        level: level.unwrap_or_else(|| UNKNOWN.to_string()),
        gold: asset_value(gold),
        silver: asset_value(silver),
    }
}

pub fn robot_token_sign(time: &str) -> String {
    sign_fields(
        &[("f", PLATFORM), ("time", time), ("v", APP_VERSION), ("weixin", "1")],
        SIGN_KEY,
    )
}

pub fn checkin_sign(time: &str, token: &str) -> String {
    sign_fields(
        &[
            ("f", PLATFORM),
            ("sk", CHECKIN_SK),
            ("time", time),
            ("token", token),
            ("v", APP_VERSION),
            ("weixin", "1"),
        ],
        SIGN_KEY,
    )
}

/// 什么值得买: the app API lives on one host, the profile page on another.
pub struct SmzdmClient {
    http: Client,
    api_base: String,
    profile_base: String,
}

impl SmzdmClient {
    /// A non-default base URL serves both hosts, which keeps a single mock server enough.
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let api_base = base_url.into();
        let profile_base = if api_base == USER_API_BASE_URL {
            PROFILE_BASE_URL.to_string()
        } else {
            api_base.clone()
        };
        Self {
            http,
            api_base,
            profile_base,
        }
    }

    async fn profile(&self, cookie: &str) -> Result<SmzdmProfile> {
        let response = self
            .http
            .get(format!("{}/user/", self.profile_base))
            .header(header::COOKIE, cookie)
            .header(header::REFERER, "https://m.smzdm.com/")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CheckinError::protocol(format!("profile page returned HTTP {}", status)));
        }
        Ok(parse_profile(&response.text().await?))
    }

    async fn robot_token(&self, cookie: &str) -> Result<String> {
        let time = timestamp_millis().to_string();
        let sign = robot_token_sign(&time);
        let response = self
            .http
            .post(format!("{}/robot/token", self.api_base))
            .header(header::COOKIE, cookie)
            .header(header::USER_AGENT, APP_USER_AGENT)
            .form(&[
                ("f", PLATFORM),
                ("v", APP_VERSION),
                ("weixin", "1"),
                ("time", time.as_str()),
                ("sign", sign.as_str()),
            ])
            .send()
            .await?;

        let body: Value = read_json_ok(response).await?;
        json_str(&body, "/data/token")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                let msg = json_str(&body, "/error_msg").unwrap_or_else(|| body.to_string());
                CheckinError::auth(format!("robot token refused: {}", msg))
            })
    }
}

#[async_trait]
impl RemoteClient for SmzdmClient {
    type Session = SmzdmSession;

    fn service_name(&self) -> &str {
        "smzdm"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<SmzdmSession> {
        let AccountCredential::Cookie(cookie) = credential else {
            return Err(CheckinError::auth(format!(
                "expected a cookie, got {}",
                credential.kind()
            )));
        };

        let profile = self.profile(cookie).await?;
        tracing::info!(
            "👤 {} (level {}), gold {}, silver {}",
            profile.name,
            profile.level,
            profile.gold,
            profile.silver
        );
        let token = self.robot_token(cookie).await?;

        Ok(SmzdmSession {
            cookie: cookie.clone(),
            token,
            profile,
        })
    }

    async fn checkin(&self, session: &SmzdmSession) -> Result<CheckinOutcome> {
        let time = timestamp_millis().to_string();
        let sign = checkin_sign(&time, &session.token);
        let response = self
            .http
            .post(format!("{}/checkin", self.api_base))
            .header(header::COOKIE, &session.cookie)
            .header(header::USER_AGENT, APP_USER_AGENT)
            .form(&[
                ("f", PLATFORM),
                ("v", APP_VERSION),
                ("sk", CHECKIN_SK),
                ("weixin", "1"),
                ("time", time.as_str()),
                ("token", session.token.as_str()),
                ("sign", sign.as_str()),
            ])
            .send()
            .await?;

        let body: Value = read_json_ok(response).await?;
        let code = json_str(&body, "/error_code").unwrap_or_default();
        let message = json_str(&body, "/error_msg").unwrap_or_default();

        Ok(if code == "0" {
            CheckinOutcome::Success(if message.is_empty() {
                "Checked in".to_string()
            } else {
                message
            })
        } else if message.contains('已') {
            CheckinOutcome::SoftFailure(message)
        } else {
            CheckinOutcome::HardFailure(format!("error_code {}: {}", code, message))
        })
    }
}
