//! Session store trait and the in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionSummary};

/// Storage for sessions, injected into whatever layer drives processing.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_session::{InMemorySessionStore, SessionStore};
///
/// let store = InMemorySessionStore::new();
/// let session = store.create("report.pdf").await?;
/// assert!(store.get(&session.id).await?.is_some());
/// ```
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create and store a new session for `filename`.
    async fn create(&self, filename: &str) -> Result<Session>;

    /// Fetch a session by id.
    async fn get(&self, id: &str) -> Result<Option<Session>>;

    /// Replace a stored session. Fails with [`SessionError::NotFound`] if the
    /// session was deleted in the meantime.
    async fn update(&self, session: Session) -> Result<()>;

    /// Delete a session, returning whether it existed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Summaries of all sessions, oldest first.
    async fn list(&self) -> Result<Vec<SessionSummary>>;
}

/// Fetch a session and require it to be ready for questions.
///
/// # Errors
///
/// [`SessionError::NotFound`] or [`SessionError::NotReady`].
pub async fn ready_session(store: &dyn SessionStore, id: &str) -> Result<Session> {
    let session = store.get(id).await?.ok_or_else(|| SessionError::NotFound(id.to_string()))?;
    if !session.is_ready() {
        return Err(SessionError::NotReady { id: id.to_string(), status: session.status });
    }
    Ok(session)
}

/// A [`SessionStore`] backed by a `HashMap` behind a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, filename: &str) -> Result<Session> {
        let session = Session::new(filename);
        self.sessions.write().await.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn get(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn update(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let slot =
            sessions.get_mut(&session.id).ok_or_else(|| SessionError::NotFound(session.id.clone()))?;
        *slot = session;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn list(&self) -> Result<Vec<SessionSummary>> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions.values().map(Session::summary).collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }
}
