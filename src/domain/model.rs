use crate::utils::mask::{mask_cookie, mask_secret, mask_string};
use std::fmt;

/// Credentials for one account, parsed once from configuration.
#[derive(Clone, PartialEq, Eq)]
pub enum AccountCredential {
    UsernamePassword { username: String, password: String },
    CookieToken { cookie: String, token: String },
    Cookie(String),
}

impl AccountCredential {
    /// Masked identifier for log lines and notification bodies.
    pub fn label(&self) -> String {
        match self {
            Self::UsernamePassword { username, .. } => mask_string(username),
            Self::CookieToken { token, .. } => format!("token {}", mask_secret(token)),
            Self::Cookie(cookie) => mask_cookie(cookie),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::UsernamePassword { .. } => "username:password",
            Self::CookieToken { .. } => "cookie#token",
            Self::Cookie(_) => "cookie",
        }
    }
}

// 不輸出任何憑證內容
impl fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountCredential({}, {})", self.kind(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckinOutcome {
    Success(String),
    /// A business answer such as "already checked in today".
    SoftFailure(String),
    HardFailure(String),
}

impl CheckinOutcome {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(m) | Self::SoftFailure(m) | Self::HardFailure(m) => m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Pending,
    Authenticating,
    CheckingIn,
    Succeeded,
    SoftFailed,
    HardFailed,
}

impl AccountState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::SoftFailed | Self::HardFailed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
}

impl BatchResult {
    pub fn record(&mut self, state: AccountState) {
        self.total += 1;
        if state == AccountState::Succeeded {
            self.succeeded += 1;
        }
    }

    pub fn summary(&self) -> String {
        format!("{}/{}", self.succeeded, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_result_counts_only_successes() {
        let mut result = BatchResult::default();
        result.record(AccountState::Succeeded);
        result.record(AccountState::SoftFailed);
        result.record(AccountState::HardFailed);

        assert_eq!(result.total, 3);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.summary(), "1/3");
    }

    #[test]
    fn test_credential_debug_hides_secrets() {
        let credential = AccountCredential::UsernamePassword {
            username: "alice@example.com".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{:?}", credential);

        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("alice@example.com"));
        assert!(debug.starts_with("AccountCredential(username:password, a"));
    }

    #[test]
    fn test_cookie_labels_tell_accounts_apart() {
        let first = AccountCredential::Cookie("SESSDATA=abc; bili_jct=1".into());
        let second = AccountCredential::Cookie("SESSDATA=xyz; bili_jct=2".into());
        assert_eq!(first.label(), "SESSDATA=a***");
        assert_ne!(first.label(), second.label());

        let paired = AccountCredential::CookieToken {
            cookie: "JSESSIONID=secret".into(),
            token: "tk-123456".into(),
        };
        assert_eq!(paired.label(), "token t***");
        assert!(!format!("{:?}", paired).contains("secret"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!AccountState::Pending.is_terminal());
        assert!(!AccountState::CheckingIn.is_terminal());
        assert!(AccountState::SoftFailed.is_terminal());
    }
}
