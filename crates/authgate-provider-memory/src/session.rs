//! In-memory session bridge.

use async_trait::async_trait;
use tokio::sync::RwLock;

use authgate_provider::AuthResult;
use authgate_provider::storage::{SessionBinding, SessionBridge};

/// Session bridge backed by an in-memory list of token-bound sessions.
///
/// The engine opens a session for every user-bound issuance, rebinds it on
/// refresh, and tears down the one bound to a revoked token. Tests inspect
/// the result through [`session_count`](Self::session_count) and
/// [`find_by_token_hash`](Self::find_by_token_hash).
#[derive(Debug, Default)]
pub struct InMemorySessionBridge {
    sessions: RwLock<Vec<SessionBinding>>,
}

fn matches(session: &SessionBinding, token_hash: &str) -> bool {
    session.access_token_hash == token_hash
        || session.refresh_token_hash.as_deref() == Some(token_hash)
}

impl InMemorySessionBridge {
    /// Creates a bridge with no open sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open sessions for a user.
    pub async fn session_count(&self, user_id: &str) -> u64 {
        self.sessions
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .count() as u64
    }

    /// Returns the session bound to a token hash, if any.
    pub async fn find_by_token_hash(&self, token_hash: &str) -> Option<SessionBinding> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|s| matches(s, token_hash))
            .cloned()
    }
}

#[async_trait]
impl SessionBridge for InMemorySessionBridge {
    async fn create_session(&self, binding: &SessionBinding) -> AuthResult<()> {
        self.sessions.write().await.push(binding.clone());
        Ok(())
    }

    async fn refresh_session(
        &self,
        old_token_hash: &str,
        binding: &SessionBinding,
    ) -> AuthResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.iter_mut().find(|s| matches(s, old_token_hash)) {
            Some(session) => *session = binding.clone(),
            // Issuance predates the bridge; adopt the session now
            None => sessions.push(binding.clone()),
        }
        Ok(())
    }

    async fn revoke_session_by_token_hash(&self, token_hash: &str) -> AuthResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| !matches(s, token_hash));
        Ok((before - sessions.len()) as u64)
    }
}
