pub mod service;
pub mod toml_config;

use crate::adapters::notify::XIZHI_BASE_URL;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use clap::Parser;
use service::ServiceKind;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::{BilibiliConfig, RunConfig};

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;
pub const NOTIFY_KEY_ENV: &str = "XIZHI_KEY";

#[derive(Debug, Clone, Parser)]
#[command(name = "daily-checkin")]
#[command(about = "Daily check-in for every configured account of one service")]
pub struct CliConfig {
    /// Service to check in to
    #[arg(value_enum)]
    pub service: ServiceKind,

    /// Optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Accounts string, overriding the service's environment variable
    #[arg(long)]
    pub accounts: Option<String>,

    /// Override the service API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifySettings {
    pub key: Option<String>,
    pub base_url: String,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub service: ServiceKind,
    /// Where the accounts string came from, for error messages.
    pub accounts_source: String,
    pub accounts_raw: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub notify: NotifySettings,
    pub bilibili: BilibiliConfig,
}

impl Settings {
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(RunConfig::from_file(path)?),
            None => None,
        };
        Self::from_parts(cli, file.as_ref(), |name| std::env::var(name).ok())
    }

    /// Precedence: CLI flag, then TOML, then environment, then built-in default.
    pub fn from_parts(
        cli: &CliConfig,
        file: Option<&RunConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let service = cli.service;
        let overrides = file.and_then(|f| f.service(service.key()));

        let accounts_env = overrides
            .and_then(|o| o.accounts_env.clone())
            .unwrap_or_else(|| service.accounts_env().to_string());

        let (accounts_source, accounts_raw) = if let Some(raw) = &cli.accounts {
            ("--accounts".to_string(), Some(raw.clone()))
        } else if let Some(raw) = overrides.and_then(|o| o.accounts.clone()) {
            (format!("services.{}.accounts", service.key()), Some(raw))
        } else {
            let raw = env(&accounts_env);
            (accounts_env.clone(), raw)
        };

        let base_url = cli
            .base_url
            .clone()
            .or_else(|| overrides.and_then(|o| o.base_url.clone()))
            .unwrap_or_else(|| service.default_base_url().to_string());

        let timeout_seconds = cli
            .timeout_seconds
            .or_else(|| file.and_then(|f| f.timeout_seconds()))
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let notify_file = file.and_then(|f| f.notify.as_ref());
        let notify_enabled = notify_file.and_then(|n| n.enabled).unwrap_or(true);
        let notify_key = if notify_enabled {
            notify_file
                .and_then(|n| n.key.clone())
                .or_else(|| env(NOTIFY_KEY_ENV))
                .filter(|k| !k.trim().is_empty())
        } else {
            None
        };
        let notify_base_url = notify_file
            .and_then(|n| n.base_url.clone())
            .unwrap_or_else(|| XIZHI_BASE_URL.to_string());

        let settings = Self {
            service,
            accounts_source,
            accounts_raw,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(timeout_seconds),
            notify: NotifySettings {
                key: notify_key,
                base_url: notify_base_url,
            },
            bilibili: file.and_then(|f| f.bilibili.clone()).unwrap_or_default(),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)?;
        validate_url("notify.base_url", &self.notify.base_url)?;
        validate_range("http.timeout_seconds", self.timeout.as_secs(), 1, 120)?;
        validate_non_empty_string("accounts source", &self.accounts_source)?;
        Ok(())
    }
}
