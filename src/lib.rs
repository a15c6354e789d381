pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{service::ServiceKind, CliConfig, Settings};
pub use crate::core::runner::BatchRunner;
pub use crate::domain::model::{AccountCredential, AccountState, BatchResult, CheckinOutcome};
pub use crate::domain::ports::{Notifier, RemoteClient};
pub use crate::utils::error::{CheckinError, Result};
