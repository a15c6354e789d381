use crate::adapters::http::read_json_ok;
use crate::config::toml_config::BilibiliConfig;
use crate::core::{AccountCredential, CheckinOutcome, RemoteClient};
use crate::utils::error::{CheckinError, Result};
use crate::utils::mask::{mask_string, mask_uid};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;

pub const API_BASE_URL: &str = "https://api.bilibili.com";
const LIVE_BASE_URL: &str = "https://api.live.bilibili.com";
const MANGA_BASE_URL: &str = "https://manga.bilibili.com";

/// Shared and watched when the dynamic feed is empty.
pub const DEFAULT_BVID: &str = "BV1GJ411x7h7";
const MAX_DAILY_COINS: u32 = 5;
const WATCH_SECONDS: &str = "30";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiliTask {
    ShareVideo,
    AddCoin,
    LiveSign,
    MangaSign,
}

impl BiliTask {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "share_video" => Some(Self::ShareVideo),
            "add_coin" => Some(Self::AddCoin),
            "live_sign" => Some(Self::LiveSign),
            "manga_sign" => Some(Self::MangaSign),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ShareVideo => "share_video",
            Self::AddCoin => "add_coin",
            Self::LiveSign => "live_sign",
            Self::MangaSign => "manga_sign",
        }
    }
}

/// Resolves configured task names; an empty list means every task.
pub fn resolve_tasks(names: &[String]) -> Vec<BiliTask> {
    let mut tasks = Vec::new();
    for name in names.iter().filter(|n| !n.trim().is_empty()) {
        match BiliTask::parse(name) {
            Some(task) if !tasks.contains(&task) => tasks.push(task),
            Some(_) => {}
            None => tracing::warn!("⚠️ Unknown bilibili task '{}', ignored", name.trim()),
        }
    }
    if tasks.is_empty() {
        tasks = vec![
            BiliTask::LiveSign,
            BiliTask::MangaSign,
            BiliTask::ShareVideo,
            BiliTask::AddCoin,
        ];
    }
    tasks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Done(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: &'static str,
    pub status: TaskStatus,
}

/// Success when at least one task actually ran and succeeded.
pub fn summarize(reports: &[TaskReport]) -> CheckinOutcome {
    let summary = reports
        .iter()
        .map(|r| match &r.status {
            TaskStatus::Done(msg) => format!("{}: {}", r.name, msg),
            TaskStatus::Skipped(msg) => format!("{}: skipped ({})", r.name, msg),
            TaskStatus::Failed(msg) => format!("{}: failed ({})", r.name, msg),
        })
        .collect::<Vec<_>>()
        .join("; ");

    if reports.iter().any(|r| matches!(r.status, TaskStatus::Done(_))) {
        CheckinOutcome::Success(summary)
    } else {
        CheckinOutcome::HardFailure(summary)
    }
}

/// `bili_jct` is the CSRF token every write endpoint expects.
pub fn csrf_from_cookie(cookie: &str) -> Option<String> {
    cookie.split(';').find_map(|item| {
        let (key, value) = item.trim().split_once('=')?;
        (key == "bili_jct" && !value.is_empty()).then(|| value.to_string())
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelInfo {
    #[serde(default)]
    pub current_level: u32,
    #[serde(default)]
    pub current_exp: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NavData {
    #[serde(rename = "isLogin", default)]
    pub is_login: bool,
    #[serde(default)]
    pub uname: String,
    #[serde(default)]
    pub mid: u64,
    #[serde(default)]
    pub money: f64,
    #[serde(default)]
    pub level_info: LevelInfo,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Clone)]
pub struct BilibiliSession {
    pub cookie: String,
    pub csrf: Option<String>,
    pub user: NavData,
}

/// Daily experience tasks. Live and manga endpoints live on their own hosts
/// unless a base URL override points everything at one server.
pub struct BilibiliClient {
    http: Client,
    api_base: String,
    live_base: String,
    manga_base: String,
    config: BilibiliConfig,
}

impl BilibiliClient {
    pub fn new(http: Client, base_url: impl Into<String>, config: BilibiliConfig) -> Self {
        let api_base = base_url.into();
        let (live_base, manga_base) = if api_base == API_BASE_URL {
            (LIVE_BASE_URL.to_string(), MANGA_BASE_URL.to_string())
        } else {
            (api_base.clone(), api_base.clone())
        };
        Self {
            http,
            api_base,
            live_base,
            manga_base,
            config,
        }
    }

    async fn get(&self, url: String, cookie: &str) -> Result<ApiResponse> {
        let response = self
            .http
            .get(url)
            .header(header::COOKIE, cookie)
            .header(header::REFERER, "https://www.bilibili.com/")
            .send()
            .await?;
        read_json_ok(response).await
    }

    async fn post(&self, url: String, cookie: &str, form: &[(&str, &str)]) -> Result<ApiResponse> {
        let response = self
            .http
            .post(url)
            .header(header::COOKIE, cookie)
            .header(header::REFERER, "https://www.bilibili.com/")
            .form(form)
            .send()
            .await?;
        read_json_ok(response).await
    }

    pub async fn nav(&self, cookie: &str) -> Result<NavData> {
        let body = self
            .get(format!("{}/x/web-interface/nav", self.api_base), cookie)
            .await?;
        if body.code != 0 {
            return Err(CheckinError::auth(format!(
                "cookie rejected (code {}): {}",
                body.code, body.message
            )));
        }
        let user: NavData = serde_json::from_value(body.data)
            .map_err(|e| CheckinError::protocol(format!("unreadable nav data: {}", e)))?;
        if !user.is_login {
            return Err(CheckinError::auth("cookie is not logged in"));
        }
        Ok(user)
    }

    async fn video_list(&self, cookie: &str, source: &str) -> Result<Vec<String>> {
        let (path, pointer) = if source == "ranking" {
            ("/x/web-interface/ranking/v2?rid=0&type=all", "/list")
        } else {
            ("/x/web-interface/dynamic/region?ps=5&rid=1", "/archives")
        };
        let body = self.get(format!("{}{}", self.api_base, path), cookie).await?;
        if body.code != 0 {
            return Ok(Vec::new());
        }
        Ok(body
            .data
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(|videos| {
                videos
                    .iter()
                    .filter_map(|v| v.get("bvid").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    fn status(body: ApiResponse, done: impl Into<String>) -> TaskStatus {
        if body.code == 0 {
            TaskStatus::Done(done.into())
        } else {
            TaskStatus::Failed(body.message)
        }
    }

    async fn share_video(&self, session: &BilibiliSession, bvid: &str) -> Result<TaskStatus> {
        let Some(csrf) = session.csrf.as_deref() else {
            return Ok(TaskStatus::Failed("bili_jct missing from cookie".to_string()));
        };
        let body = self
            .post(
                format!("{}/x/web-interface/share/add", self.api_base),
                &session.cookie,
                &[("bvid", bvid), ("csrf", csrf)],
            )
            .await?;
        Ok(Self::status(body, "shared"))
    }

    async fn watch_video(&self, session: &BilibiliSession, bvid: &str) -> Result<TaskStatus> {
        let csrf = session.csrf.as_deref().unwrap_or_default();
        let body = self
            .post(
                format!("{}/x/click-interface/web/heartbeat", self.api_base),
                &session.cookie,
                &[("bvid", bvid), ("played_time", WATCH_SECONDS), ("csrf", csrf)],
            )
            .await?;
        Ok(Self::status(body, "watched"))
    }

    async fn live_sign(&self, session: &BilibiliSession) -> Result<TaskStatus> {
        let body = self
            .get(
                format!("{}/xlive/web-ucenter/v1/sign/DoSign", self.live_base),
                &session.cookie,
            )
            .await?;
        let text = body
            .data
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("signed")
            .to_string();
        Ok(Self::status(body, text))
    }

    async fn manga_sign(&self, session: &BilibiliSession) -> Result<TaskStatus> {
        let body = self
            .post(
                format!("{}/twirp/activity.v1.Activity/ClockIn", self.manga_base),
                &session.cookie,
                &[("platform", "ios")],
            )
            .await?;
        Ok(Self::status(body, "clocked in"))
    }

    async fn add_coins(&self, session: &BilibiliSession) -> Result<TaskStatus> {
        let wanted = self.config.coin_add_num;
        if wanted == 0 {
            return Ok(TaskStatus::Skipped("configured to 0".to_string()));
        }
        let balance = session.user.money;
        if balance < 1.0 {
            return Ok(TaskStatus::Skipped(format!("only {} coin(s)", balance)));
        }
        let Some(csrf) = session.csrf.as_deref() else {
            return Ok(TaskStatus::Failed("bili_jct missing from cookie".to_string()));
        };

        let target = wanted.min(balance.floor() as u32).min(MAX_DAILY_COINS);
        let videos = self
            .video_list(&session.cookie, &self.config.coin_video_source)
            .await?;
        if videos.is_empty() {
            return Ok(TaskStatus::Failed("no candidate videos".to_string()));
        }

        let select_like = if self.config.coin_select_like { "1" } else { "0" };
        let mut added = 0;
        for bvid in &videos {
            if added >= target {
                break;
            }
            let body = self
                .post(
                    format!("{}/x/web-interface/coin/add", self.api_base),
                    &session.cookie,
                    &[
                        ("bvid", bvid.as_str()),
                        ("multiply", "1"),
                        ("select_like", select_like),
                        ("csrf", csrf),
                    ],
                )
                .await?;

            if body.code == 0 {
                added += 1;
                tracing::debug!("🪙 Coin added to {}", bvid);
            } else if body.message.contains("已达到") {
                tracing::warn!("⚠️ Daily coin limit reached");
                break;
            } else {
                tracing::warn!("⚠️ Coin for {} refused: {}", bvid, body.message);
                if body.message.contains("硬币不足") {
                    break;
                }
            }
        }

        Ok(TaskStatus::Done(format!("{} of {} coin(s) added", added, target)))
    }

    async fn run_task(&self, session: &BilibiliSession, task: BiliTask, bvid: &str) -> TaskStatus {
        let result = match task {
            BiliTask::ShareVideo => self.share_video(session, bvid).await,
            BiliTask::AddCoin => self.add_coins(session).await,
            BiliTask::LiveSign => self.live_sign(session).await,
            BiliTask::MangaSign => self.manga_sign(session).await,
        };
        result.unwrap_or_else(|e| TaskStatus::Failed(e.to_string()))
    }
}

#[async_trait]
impl RemoteClient for BilibiliClient {
    type Session = BilibiliSession;

    fn service_name(&self) -> &str {
        "bilibili"
    }

    async fn authenticate(&self, credential: &AccountCredential) -> Result<BilibiliSession> {
        let AccountCredential::Cookie(cookie) = credential else {
            return Err(CheckinError::auth(format!(
                "expected a cookie, got {}",
                credential.kind()
            )));
        };

        let user = self.nav(cookie).await?;
        tracing::info!(
            "👤 {} (uid {}), level {}, exp {}, coins {}",
            mask_string(&user.uname),
            mask_uid(&user.mid.to_string()),
            user.level_info.current_level,
            user.level_info.current_exp,
            user.money
        );

        Ok(BilibiliSession {
            cookie: cookie.clone(),
            csrf: csrf_from_cookie(cookie),
            user,
        })
    }

    async fn checkin(&self, session: &BilibiliSession) -> Result<CheckinOutcome> {
        let feed = self
            .video_list(&session.cookie, "dynamic")
            .await
            .unwrap_or_default();
        let bvid = feed.first().map(String::as_str).unwrap_or(DEFAULT_BVID);

        let mut reports = Vec::new();
        // 投幣等任務依設定順序執行，觀看影片一律執行
        for task in resolve_tasks(&self.config.tasks) {
            let status = self.run_task(session, task, bvid).await;
            tracing::debug!("{}: {:?}", task.name(), status);
            reports.push(TaskReport {
                name: task.name(),
                status,
            });
        }
        let watch = self
            .watch_video(session, bvid)
            .await
            .unwrap_or_else(|e| TaskStatus::Failed(e.to_string()));
        reports.push(TaskReport {
            name: "watch_video",
            status: watch,
        });

        Ok(summarize(&reports))
    }
}
