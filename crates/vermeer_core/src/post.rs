//! Generated posts and their lifecycle.

use crate::{ChannelId, MediaRef, PlanId, PostId, SourceItemId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post lifecycle state.
///
/// ```text
/// draft ──────────┬──────────────► pending_review ──► draft / scheduled / publishing
///                 ├──────────────► scheduled ───────► publishing / draft
///                 └──────────────► publishing ──────► published / failed
///                                  failed ──────────► publishing
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PostStatus {
    /// Not scheduled; waits for an operator
    Draft,
    /// Waiting for a reviewer decision
    PendingReview,
    /// Will be published at `scheduled_at`
    Scheduled,
    /// A publish job owns the post
    Publishing,
    /// Published to the channel
    Published,
    /// Publishing gave up
    Failed,
}

impl PostStatus {
    /// Whether a post may move from `self` to `next`.
    pub fn can_transition_to(self, next: PostStatus) -> bool {
        use PostStatus::*;
        matches!(
            (self, next),
            (Draft, PendingReview | Scheduled | Publishing)
                | (PendingReview, Draft | Scheduled | Publishing)
                | (Scheduled, Publishing | Draft)
                | (Publishing, Published | Failed)
                | (Failed, Publishing)
        )
    }

    /// Whether this status requires a scheduled time.
    pub fn requires_schedule(self) -> bool {
        self != PostStatus::Draft
    }
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post identifier
    pub id: PostId,
    /// Channel the post belongs to
    pub channel_id: ChannelId,
    /// Plan that generated it, if any
    pub plan_id: Option<PlanId>,
    /// Post text
    pub content: String,
    /// Lifecycle state
    pub status: PostStatus,
    /// When the post is (or was) due
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Attached media
    pub media: Vec<MediaRef>,
    /// Source items the text was generated from
    pub source_item_ids: Vec<SourceItemId>,
    /// Created by a plan execution rather than by hand
    pub auto_generated: bool,
    /// Carries a generated image
    pub image_generated: bool,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// When the post went out
    pub published_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Whether `scheduled_at` is consistent with `status`.
    pub fn schedule_is_consistent(&self) -> bool {
        !self.status.requires_schedule() || self.scheduled_at.is_some()
    }
}

/// Fields for creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Channel the post belongs to
    pub channel_id: ChannelId,
    /// Plan that generated it, if any
    pub plan_id: Option<PlanId>,
    /// Post text
    pub content: String,
    /// Initial lifecycle state
    pub status: PostStatus,
    /// When the post is due
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Attached media
    pub media: Vec<MediaRef>,
    /// Source items the text was generated from
    pub source_item_ids: Vec<SourceItemId>,
    /// Created by a plan execution
    pub auto_generated: bool,
    /// Carries a generated image
    pub image_generated: bool,
    /// Creation time, as seen by the creating job
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    /// Materialize the record with a fresh identifier.
    pub fn into_post(self) -> Post {
        let now = self.created_at;
        Post {
            id: PostId::new(),
            channel_id: self.channel_id,
            plan_id: self.plan_id,
            content: self.content,
            status: self.status,
            scheduled_at: self.scheduled_at,
            media: self.media,
            source_item_ids: self.source_item_ids,
            auto_generated: self.auto_generated,
            image_generated: self.image_generated,
            created_at: now,
            updated_at: now,
            published_at: None,
        }
    }
}
