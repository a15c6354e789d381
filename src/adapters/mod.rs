// Adapters layer: concrete implementations for external systems (http, notification).

pub mod http;
pub mod notify;
