use crate::domain::model::{ForecastResult, Subseries};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn dataset_path(&self) -> &str;
    fn users_path(&self) -> &str;
    fn bind_address(&self) -> &str;
    fn store_id(&self) -> &str;
    fn default_days(&self) -> u32;
    fn max_days(&self) -> u32;
    fn min_history(&self) -> usize;
    fn normalize_ids(&self) -> bool;
    fn chart_enabled(&self) -> bool;
}

/// Username/password registry backing signup and login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<()>;
    async fn verify(&self, username: &str, password: &str) -> Result<bool>;
}

/// Maps opaque session tokens to usernames.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, username: &str) -> String;
    async fn resolve(&self, token: &str) -> Option<String>;
    async fn revoke(&self, token: &str) -> bool;
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, history: &Subseries, forecast: &ForecastResult) -> Result<Vec<u8>>;
}
