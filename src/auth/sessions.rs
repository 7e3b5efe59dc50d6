use crate::auth::UserId;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: Instant,
}

/// Opaque session tokens mapped to users until they expire
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a session and return its token. Expired sessions are swept first.
    pub async fn create(&self, user_id: UserId) -> String {
        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let session = Session {
            user_id,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now < s.expires_at);
        let swept = before - sessions.len();
        sessions.insert(token.clone(), session);

        debug!(user_id, swept, "Session created");
        token
    }

    /// User behind a live token. Expired sessions are dropped.
    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        let session = *self.sessions.read().await.get(token)?;
        if Instant::now() < session.expires_at {
            return Some(session.user_id);
        }

        self.sessions.write().await.remove(token);
        debug!(user_id = session.user_id, "Session expired");
        None
    }

    /// End a session. Returns false if the token was unknown.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
