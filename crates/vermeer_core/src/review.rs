//! Review records and edit sessions.

use crate::{ChannelId, ConversationId, MediaRef, MessageId, PlanId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Links a `pending_review` post to the notification carrying its controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReview {
    /// Post awaiting review
    pub post_id: PostId,
    /// Channel the post belongs to
    pub channel_id: ChannelId,
    /// Where the notification was sent
    pub recipient: String,
    /// Notification message, once the transport accepted it
    pub message_id: Option<MessageId>,
    /// When the review was opened
    pub created_at: DateTime<Utc>,
}

/// Sub-mode of an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Waiting for a button press
    #[default]
    None,
    /// The next free-text message is an edit instruction
    AwaitingTextInstruction,
}

/// In-memory state of a reviewer editing a pending post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewEditSession {
    /// Reviewer conversation that owns the session
    pub conversation: ConversationId,
    /// Post being edited
    pub post_id: PostId,
    /// Channel the post belongs to
    pub channel_id: ChannelId,
    /// Plan that generated the post
    pub plan_id: Option<PlanId>,
    /// Content when the session opened
    pub original_content: String,
    /// Current working content
    pub current_content: String,
    /// Current image
    pub image: Option<MediaRef>,
    /// Sub-mode
    pub mode: EditMode,
}

impl ReviewEditSession {
    /// Whether the working content has moved away from the snapshot.
    pub fn is_modified(&self) -> bool {
        self.current_content != self.original_content
    }
}
