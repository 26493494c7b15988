use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glidedesk_core::ToolError;
use serde::Serialize;
use uuid::Uuid;

/// Conversation state handle owned by the session collaborator, keyed by
/// `(app_name, user_id, session_id)`. The routing core never stores
/// per-turn state here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Session {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, ToolError>;

    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, ToolError>;
}

/// Returns the existing session when the caller supplies a known id, and
/// otherwise creates one — minting a fresh UUID id when none was given.
pub async fn resolve_session(
    store: &dyn SessionStore,
    app_name: &str,
    user_id: &str,
    session_id: Option<&str>,
) -> Result<Session, ToolError> {
    match session_id {
        Some(session_id) => match store.get(app_name, user_id, session_id).await? {
            Some(session) => Ok(session),
            None => store.create(app_name, user_id, session_id).await,
        },
        None => {
            let session_id = Uuid::new_v4().to_string();
            store.create(app_name, user_id, &session_id).await
        }
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<(String, String, String), Session>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, ToolError> {
        let session = Session {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        let key = (app_name.to_string(), user_id.to_string(), session_id.to_string());
        Ok(sessions.entry(key).or_insert(session).clone())
    }

    async fn get(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<Session>, ToolError> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        let key = (app_name.to_string(), user_id.to_string(), session_id.to_string());
        Ok(sessions.get(&key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve_session, InMemorySessionStore, SessionStore};

    const APP: &str = "logistics-customer-support";

    #[tokio::test]
    async fn resolve_mints_an_id_when_none_is_given() {
        let store = InMemorySessionStore::default();
        let session = resolve_session(&store, APP, "u1", None).await.expect("session");

        assert!(!session.session_id.is_empty());
        let fetched =
            store.get(APP, "u1", &session.session_id).await.expect("lookup").expect("stored");
        assert_eq!(fetched, session);
    }

    #[tokio::test]
    async fn resolve_returns_the_existing_session() {
        let store = InMemorySessionStore::default();
        let first = resolve_session(&store, APP, "u1", Some("s-1")).await.expect("session");
        let second = resolve_session(&store, APP, "u1", Some("s-1")).await.expect("session");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = InMemorySessionStore::default();
        resolve_session(&store, APP, "u1", Some("s-1")).await.expect("session");
        let other = store.get(APP, "u2", "s-1").await.expect("lookup");
        assert!(other.is_none());
    }
}
