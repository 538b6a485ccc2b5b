//! Process-wide session context.
//!
//! Access tokens are resolved against the identity provider once and the
//! resulting user is remembered until sign-out or until the entry ages out.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::{error::AppResult, models::User, services::providers::IdentityProvider};

/// How long a resolved token is trusted before asking the identity provider again
pub const SESSION_TTL: Duration = Duration::from_secs(300);

struct SessionEntry {
    user: User,
    resolved_at: Instant,
}

/// Single source of truth for "who is signed in with this token"
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the user for `access_token`, asking the identity provider on a miss
    pub async fn resolve(
        &self,
        identity: &dyn IdentityProvider,
        access_token: &str,
    ) -> AppResult<Option<User>> {
        if let Some(entry) = self.sessions.read().await.get(access_token) {
            if entry.resolved_at.elapsed() < self.ttl {
                return Ok(Some(entry.user.clone()));
            }
        }

        match identity.current_user(access_token).await? {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "Session resolved");
                let mut sessions = self.sessions.write().await;
                self.prune_expired(&mut sessions);
                sessions.insert(
                    access_token.to_string(),
                    SessionEntry {
                        user: user.clone(),
                        resolved_at: Instant::now(),
                    },
                );
                Ok(Some(user))
            }
            None => {
                let mut sessions = self.sessions.write().await;
                self.prune_expired(&mut sessions);
                sessions.remove(access_token);
                Ok(None)
            }
        }
    }

    /// Drops entries older than the TTL; rotated tokens never come back to replace them
    fn prune_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.resolved_at.elapsed() < self.ttl);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = sessions.len(), "Expired sessions pruned");
        }
    }

    /// Forgets the session behind `access_token`, returning its user if known
    pub async fn invalidate(&self, access_token: &str) -> Option<User> {
        self.sessions
            .write()
            .await
            .remove(access_token)
            .map(|entry| entry.user)
    }

    /// Number of remembered sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
