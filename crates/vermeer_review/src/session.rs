//! In-memory edit sessions.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vermeer_core::{ConversationId, PostId, ReviewEditSession};

/// Open edit sessions, one per reviewer conversation.
///
/// Lives in process memory only; a restart drops open sessions and the posts
/// keep whatever content was last persisted.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<ConversationId, ReviewEditSession>>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session open in `conversation`, if any.
    pub async fn get(&self, conversation: &ConversationId) -> Option<ReviewEditSession> {
        self.sessions.read().await.get(conversation).cloned()
    }

    /// Install `session` for `conversation`, or close it on `None`.
    pub async fn replace(
        &self,
        conversation: &ConversationId,
        session: Option<ReviewEditSession>,
    ) {
        let mut sessions = self.sessions.write().await;
        match session {
            Some(session) => {
                sessions.insert(conversation.clone(), session);
            }
            None => {
                sessions.remove(conversation);
            }
        }
    }

    /// Session editing `post_id` in any conversation.
    pub async fn for_post(&self, post_id: PostId) -> Option<ReviewEditSession> {
        self.sessions
            .read()
            .await
            .values()
            .find(|s| s.post_id == post_id)
            .cloned()
    }

    /// Number of open sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is open.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
