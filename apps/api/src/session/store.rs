use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::config::MAX_SESSION_TTL_MINUTES;
use crate::errors::AppError;
use crate::session::models::Session;

/// In-memory store of live sessions, shared through `AppState`.
///
/// The lock is held only for the closure passed to [`SessionStore::with_session`];
/// never across a provider call.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    max_turns: usize,
    ttl: Duration,
}

impl SessionStore {
    /// The TTL is clamped to `1..=MAX_SESSION_TTL_MINUTES`.
    pub fn new(max_turns: usize, ttl_minutes: i64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_turns,
            ttl: Duration::minutes(ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES)),
        }
    }

    pub async fn create(&self) -> Uuid {
        let session = Session::new(self.max_turns);
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        info!("Session {id} created");
        id
    }

    /// Runs `f` against a live session and marks it active. An idle session
    /// past its TTL is dropped and reported as not found.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, AppError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get(&id) {
            Some(session) => self.is_expired(session, now),
            None => return Err(not_found(id)),
        };
        if expired {
            sessions.remove(&id);
            info!("Session {id} expired");
            return Err(not_found(id));
        }

        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.touch(now);
        Ok(f(session))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {id} discarded"))
            .ok_or_else(|| not_found(id))
    }

    /// Drops every session idle for longer than the TTL. Returns how many went.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        before - sessions.len()
    }

    pub async fn live_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.last_active > self.ttl
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::models::Role;

    #[tokio::test]
    async fn test_create_and_mutate_session() {
        let store = SessionStore::new(10, 60);
        let id = store.create().await;

        store
            .with_session(id, |s| s.append_turn(Role::User, "hi"))
            .await
            .unwrap();
        let len = store.with_session(id, |s| s.history().len()).await.unwrap();

        assert_eq!(len, 1);
        assert_eq!(store.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = SessionStore::new(10, 60);
        let err = store.with_session(Uuid::new_v4(), |_| ()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_discards_session() {
        let store = SessionStore::new(10, 60);
        let id = store.create().await;
        store.remove(id).await.unwrap();
        assert!(store.remove(id).await.is_err());
        assert!(store.with_session(id, |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_drops_only_idle_sessions() {
        let store = SessionStore::new(10, 30);
        let idle = store.create().await;
        let active = store.create().await;

        store
            .with_session(idle, |s| s.touch(Utc::now() - Duration::minutes(45)))
            .await
            .unwrap();

        let purged = store.purge_expired(Utc::now()).await;
        assert_eq!(purged, 1);
        assert!(store.with_session(active, |_| ()).await.is_ok());
        assert!(store.with_session(idle, |_| ()).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_served() {
        let store = SessionStore::new(10, 30);
        let id = store.create().await;
        store
            .with_session(id, |s| s.touch(Utc::now() - Duration::minutes(31)))
            .await
            .unwrap();

        assert!(store.with_session(id, |_| ()).await.is_err());
        assert_eq!(store.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_non_positive_ttl_still_serves_new_sessions() {
        let store = SessionStore::new(10, 0);
        let id = store.create().await;
        assert!(store.with_session(id, |_| ()).await.is_ok());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let store = SessionStore::new(10, i64::MAX);
        let id = store.create().await;
        store
            .with_session(id, |s| s.touch(Utc::now() - Duration::days(30)))
            .await
            .unwrap();
        assert_eq!(store.purge_expired(Utc::now()).await, 0);
    }
}
