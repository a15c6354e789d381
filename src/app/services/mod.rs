//! One `RemoteClient` per supported vendor.

pub mod bilibili;
pub mod coder996;
pub mod glados;
pub mod maidanba;
pub mod mindvideo;
pub mod mulan;
pub mod music163;
pub mod smzdm;
pub mod sparkai;

pub use bilibili::BilibiliClient;
pub use coder996::Coder996Client;
pub use glados::GladosClient;
pub use maidanba::MaidanbaClient;
pub use mindvideo::MindVideoClient;
pub use mulan::MulanClient;
pub use music163::Music163Client;
pub use smzdm::SmzdmClient;
pub use sparkai::SparkAiClient;
