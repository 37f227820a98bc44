// Adapters layer: concrete implementations for external systems (http, credentials, sessions, charts).

pub mod chart;
pub mod credentials;
pub mod http;
pub mod sessions;
