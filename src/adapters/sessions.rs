use crate::core::SessionStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Process-local sessions; restarting the server logs everyone out.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, username: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions
            .lock()
            .await
            .insert(token.clone(), username.to_string());
        token
    }

    async fn resolve(&self, token: &str) -> Option<String> {
        self.sessions.lock().await.get(token).cloned()
    }

    async fn revoke(&self, token: &str) -> bool {
        self.sessions.lock().await.remove(token).is_some()
    }
}
