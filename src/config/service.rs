use crate::core::accounts::{AccountSource, CredentialShape, MalformedPolicy};
use clap::ValueEnum;

/// Every service the binary knows how to check in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ServiceKind {
    Glados,
    Mulan,
    #[value(name = "996coder", alias = "coder996")]
    Coder996,
    #[value(name = "music163")]
    Music163,
    Mindvideo,
    Sparkai,
    Maidanba,
    Smzdm,
    Bilibili,
}

impl ServiceKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Glados => "glados",
            Self::Mulan => "mulan",
            Self::Coder996 => "996coder",
            Self::Music163 => "music163",
            Self::Mindvideo => "mindvideo",
            Self::Sparkai => "sparkai",
            Self::Maidanba => "maidanba",
            Self::Smzdm => "smzdm",
            Self::Bilibili => "bilibili",
        }
    }

    pub fn accounts_env(&self) -> &'static str {
        match self {
            Self::Glados => "GLADOS_COOKIES",
            Self::Mulan => "MULAN_ACCOUNTS",
            Self::Coder996 => "NINENINESIX_CODER_ACCOUNTS",
            Self::Music163 => "MUSIC163_COOKIES",
            Self::Mindvideo => "MINDVIDEO_ACCOUNTS",
            Self::Sparkai => "SPARKAIGF_ACCOUNTS",
            Self::Maidanba => "MAIDANBA_ACCOUNTS",
            Self::Smzdm => "SMZDM_COOKIES",
            Self::Bilibili => "BILIBILI_COOKIES",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Glados => "https://glados.cloud",
            Self::Mulan => "https://api3.mulan.pro",
            Self::Coder996 => "https://996coder.com",
            Self::Music163 => "http://music.163.com",
            Self::Mindvideo => "https://api.mindvideo.ai/api",
            Self::Sparkai => "https://ai.sparkaigf.com/api",
            Self::Maidanba => "https://creditcardapp.bankcomm.com/mdlweb",
            Self::Smzdm => "https://user-api.smzdm.com",
            Self::Bilibili => "https://api.bilibili.com",
        }
    }

    /// Account string format and how strictly malformed entries are treated.
    pub fn account_source(&self) -> AccountSource {
        match self {
            Self::Glados => AccountSource::new(CredentialShape::Cookie, MalformedPolicy::Skip)
                .with_account_delimiter("&"),
            Self::Music163 | Self::Smzdm | Self::Bilibili => {
                AccountSource::new(CredentialShape::Cookie, MalformedPolicy::Skip)
            }
            Self::Coder996 => {
                AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Skip)
            }
            Self::Mulan | Self::Mindvideo | Self::Sparkai => {
                AccountSource::new(CredentialShape::UsernamePassword, MalformedPolicy::Abort)
            }
            Self::Maidanba => AccountSource::new(CredentialShape::CookieToken, MalformedPolicy::Abort),
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
