use crate::domain::model::AccountCredential;
use crate::utils::error::{CheckinError, Result};

pub const DEFAULT_ACCOUNT_DELIMITER: &str = "||";

/// Which credential variant each account segment becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialShape {
    UsernamePassword,
    CookieToken,
    Cookie,
}

/// What to do with a segment that lacks the field delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    Skip,
    Abort,
}

#[derive(Debug, Clone)]
pub struct AccountSource {
    shape: CredentialShape,
    policy: MalformedPolicy,
    account_delimiter: String,
    field_delimiter: char,
}

impl AccountSource {
    pub fn new(shape: CredentialShape, policy: MalformedPolicy) -> Self {
        let field_delimiter = match shape {
            CredentialShape::CookieToken => '#',
            _ => ':',
        };
        Self {
            shape,
            policy,
            account_delimiter: DEFAULT_ACCOUNT_DELIMITER.to_string(),
            field_delimiter,
        }
    }

    pub fn with_account_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.account_delimiter = delimiter.into();
        self
    }

    pub fn with_field_delimiter(mut self, delimiter: char) -> Self {
        self.field_delimiter = delimiter;
        self
    }

    pub fn shape(&self) -> CredentialShape {
        self.shape
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Reads and parses the named environment variable.
    pub fn from_env(&self, var_name: &str) -> Result<Vec<AccountCredential>> {
        let raw = std::env::var(var_name).ok();
        self.parse(var_name, raw.as_deref())
    }

    /// `source_name` only labels errors; it is usually the environment variable name.
    pub fn parse(&self, source_name: &str, raw: Option<&str>) -> Result<Vec<AccountCredential>> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return Err(CheckinError::MissingConfigError {
                    field: source_name.to_string(),
                })
            }
        };

        let mut accounts = Vec::new();
        for (idx, segment) in raw
            .split(self.account_delimiter.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .enumerate()
        {
            match self.parse_segment(segment) {
                Some(credential) => accounts.push(credential),
                None => match self.policy {
                    MalformedPolicy::Skip => {
                        tracing::warn!(
                            "⚠️ Skipping account #{} in {}: expected {}",
                            idx + 1,
                            source_name,
                            self.expected_format()
                        );
                    }
                    MalformedPolicy::Abort => {
                        return Err(CheckinError::InvalidConfigValueError {
                            field: source_name.to_string(),
                            value: preview(segment),
                            reason: format!("account #{} must be {}", idx + 1, self.expected_format()),
                        });
                    }
                },
            }
        }

        if accounts.is_empty() {
            return Err(CheckinError::config(format!(
                "{} contains no usable accounts",
                source_name
            )));
        }

        tracing::info!("📋 Loaded {} account(s) from {}", accounts.len(), source_name);
        Ok(accounts)
    }

    fn parse_segment(&self, segment: &str) -> Option<AccountCredential> {
        match self.shape {
            CredentialShape::Cookie => Some(AccountCredential::Cookie(segment.to_string())),
            CredentialShape::UsernamePassword => {
                self.split_pair(segment)
                    .map(|(username, password)| AccountCredential::UsernamePassword {
                        username,
                        password,
                    })
            }
            CredentialShape::CookieToken => {
                self.split_pair(segment)
                    .map(|(cookie, token)| AccountCredential::CookieToken { cookie, token })
            }
        }
    }

    fn split_pair(&self, segment: &str) -> Option<(String, String)> {
        let (first, second) = segment.split_once(self.field_delimiter)?;
        let (first, second) = (first.trim(), second.trim());
        if first.is_empty() || second.is_empty() {
            return None;
        }
        Some((first.to_string(), second.to_string()))
    }

    fn expected_format(&self) -> String {
        match self.shape {
            CredentialShape::UsernamePassword => format!("user{}password", self.field_delimiter),
            CredentialShape::CookieToken => format!("cookie{}token", self.field_delimiter),
            CredentialShape::Cookie => "cookie".to_string(),
        }
    }
}

// 錯誤訊息中只保留前 20 個字元
fn preview(segment: &str) -> String {
    let head: String = segment.chars().take(20).collect();
    if head.len() < segment.len() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    fn strict() -> AccountSource {
        AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Abort)
    }

    #[test]
    fn test_parses_one_credential_per_segment() {
        let accounts = strict()
            .parse("MULAN_ACCOUNTS", Some("a@x.com:pw1||b@x.com:pw2|| c@x.com : pw3 "))
            .unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(
            accounts[2],
            AccountCredential::UsernamePassword {
                username: "c@x.com".into(),
                password: "pw3".into(),
            }
        );
    }

    #[test]
    fn test_password_may_contain_field_delimiter() {
        let accounts = strict().parse("X", Some("user:pa:ss")).unwrap();
        assert_eq!(
            accounts[0],
            AccountCredential::UsernamePassword {
                username: "user".into(),
                password: "pa:ss".into(),
            }
        );
    }

    #[test]
    fn test_empty_segments_are_ignored() {
        let accounts = strict().parse("X", Some("||a:1|| ||b:2||")).unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[test]
    fn test_empty_or_absent_input_is_configuration_error() {
        for raw in [None, Some(""), Some("   ")] {
            let err = strict().parse("MULAN_ACCOUNTS", raw).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Configuration);
            assert!(err.is_fatal());
        }
    }

    #[test]
    fn test_only_delimiters_is_configuration_error() {
        let err = strict().parse("X", Some("|| ||")).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_abort_policy_rejects_malformed_segment() {
        let err = strict().parse("X", Some("a:1||broken")).unwrap_err();
        assert!(matches!(err, CheckinError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_skip_policy_drops_malformed_segment() {
        let source = AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Skip);
        let accounts = source.parse("X", Some("a:1||broken||b:2")).unwrap();
        assert_eq!(accounts.len(), 2);
    }

    #[test]
    fn test_skip_policy_with_nothing_left_is_error() {
        let source = AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Skip);
        assert!(source.parse("X", Some("broken||also-broken")).is_err());
    }

    #[test]
    fn test_cookie_token_uses_hash_delimiter() {
        let source = AccountSource::new(CredentialShape::CookieToken, MalformedPolicy::Abort);
        let accounts = source.parse("MAIDANBA_ACCOUNTS", Some("c=1; d=2#tok1||c=3#tok2")).unwrap();

        assert_eq!(
            accounts[0],
            AccountCredential::CookieToken {
                cookie: "c=1; d=2".into(),
                token: "tok1".into(),
            }
        );
        assert_eq!(accounts.len(), 2);
    }

    #[test]
    fn test_custom_delimiters() {
        let source = AccountSource::new(CredentialShape::Cookie, MalformedPolicy::Skip)
            .with_account_delimiter("&");
        let accounts = source.parse("GLADOS_COOKIES", Some("koa:sess=1&koa:sess=2")).unwrap();
        assert_eq!(accounts, vec![
            AccountCredential::Cookie("koa:sess=1".into()),
            AccountCredential::Cookie("koa:sess=2".into()),
        ]);

        let hashed = AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Abort)
            .with_field_delimiter('#');
        assert!(hashed.parse("X", Some("user#pw")).is_ok());
        assert!(hashed.parse("X", Some("user:pw")).is_err());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("DAILY_CHECKIN_TEST_ACCOUNTS", "u1:p1||u2:p2");
        let accounts = strict().from_env("DAILY_CHECKIN_TEST_ACCOUNTS").unwrap();
        assert_eq!(accounts.len(), 2);
        std::env::remove_var("DAILY_CHECKIN_TEST_ACCOUNTS");

        assert!(strict().from_env("DAILY_CHECKIN_TEST_UNSET_VAR").is_err());
    }
}
