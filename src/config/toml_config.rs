use crate::utils::error::{CheckinError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Optional file-based configuration. Every table may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    pub http: Option<HttpConfig>,
    pub notify: Option<NotifyConfig>,
    #[serde(default)]
    pub services: HashMap<String, ServiceOverrides>,
    pub bilibili: Option<BilibiliConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub enabled: Option<bool>,
    pub key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceOverrides {
    pub base_url: Option<String>,
    pub accounts_env: Option<String>,
    pub accounts: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BilibiliConfig {
    pub tasks: Vec<String>,
    pub coin_add_num: u32,
    pub coin_select_like: bool,
    pub coin_video_source: String,
}

impl Default for BilibiliConfig {
    fn default() -> Self {
        Self {
            tasks: vec!["share_video".to_string(), "add_coin".to_string()],
            coin_add_num: 1,
            coin_select_like: true,
            coin_video_source: "dynamic".to_string(),
        }
    }
}

impl RunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CheckinError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CheckinError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${XIZHI_KEY})；未設定的變數視為配置錯誤
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| CheckinError::config(format!("Invalid substitution pattern: {}", e)))?;

        let mut missing = Vec::new();
        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    missing.push(var_name.to_string());
                    String::new()
                }
            }
        });

        if let Some(var_name) = missing.first() {
            return Err(CheckinError::MissingConfigError {
                field: var_name.clone(),
            });
        }
        Ok(result.to_string())
    }

    pub fn service(&self, key: &str) -> Option<&ServiceOverrides> {
        self.services.get(key)
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.http.as_ref().and_then(|h| h.timeout_seconds)
    }
}
