use crate::core::{CredentialStore, Storage};
use crate::utils::error::{ForecastError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Credential {
    username: String,
    password: String,
}

/// Plain `username,password` CSV file.
///
/// Every signup rewrites the whole file. The mutex keeps two concurrent
/// signups from both reading the old contents and dropping each other's row.
pub struct CsvCredentialStore<S: Storage> {
    storage: S,
    path: String,
    write_lock: Mutex<()>,
}

impl<S: Storage> CsvCredentialStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a header-only file when none exists yet.
    pub async fn ensure_exists(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        match self.storage.read_file(&self.path).await {
            Ok(_) => Ok(()),
            Err(ForecastError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Creating empty credential file {}", self.path);
                self.write_all(&[]).await
            }
            Err(e) => Err(e),
        }
    }

    async fn read_all(&self) -> Result<Vec<Credential>> {
        let bytes = match self.storage.read_file(&self.path).await {
            Ok(bytes) => bytes,
            Err(ForecastError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());
        let mut credentials = Vec::new();
        for row in reader.deserialize::<Credential>() {
            credentials.push(row?);
        }
        Ok(credentials)
    }

    async fn write_all(&self, credentials: &[Credential]) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(["username", "password"])?;
        for credential in credentials {
            writer.write_record([credential.username.as_str(), credential.password.as_str()])?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| ForecastError::IoError(e.into_error()))?;

        self.storage.write_file(&self.path, &data).await
    }
}

#[async_trait]
impl<S: Storage> CredentialStore for CsvCredentialStore<S> {
    async fn register(&self, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        let password = password.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ForecastError::validation(
                "Username and password must not be empty",
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut credentials = self.read_all().await?;
        if credentials.iter().any(|c| c.username == username) {
            return Err(ForecastError::DuplicateUserError {
                username: username.to_string(),
            });
        }

        credentials.push(Credential {
            username: username.to_string(),
            password: password.to_string(),
        });
        self.write_all(&credentials).await?;
        tracing::info!("Registered user {}", username);
        Ok(())
    }

    async fn verify(&self, username: &str, password: &str) -> Result<bool> {
        let username = username.trim();
        let password = password.trim();
        let credentials = self.read_all().await?;
        Ok(credentials
            .iter()
            .any(|c| c.username == username && c.password == password))
    }
}
