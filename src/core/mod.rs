pub mod accounts;
pub mod runner;
pub mod signing;

pub use crate::domain::model::{AccountCredential, AccountState, BatchResult, CheckinOutcome};
pub use crate::domain::ports::{Notifier, RemoteClient};
pub use crate::utils::error::Result;
