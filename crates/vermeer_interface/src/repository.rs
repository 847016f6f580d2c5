//! Record store traits.
//!
//! The storage schema and query layer live outside this workspace; these
//! traits are the queries the pipeline needs from it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use vermeer_core::{
    Channel, ChannelId, ContentPlan, MediaRef, MessageId, NewPost, PendingReview, PlanId, Post,
    PostId, PostStatus, SourceId, SourceItem, SourceItemId,
};
use vermeer_error::VermeerResult;

/// Content plan storage.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Load a plan.
    async fn get_plan(&self, id: PlanId) -> VermeerResult<Option<ContentPlan>>;

    /// All plans, enabled or not.
    async fn list_plans(&self) -> VermeerResult<Vec<ContentPlan>>;

    /// Insert or replace a plan.
    async fn save_plan(&self, plan: ContentPlan) -> VermeerResult<()>;
}

/// Post storage.
///
/// Every status write goes through [`PostRepository::update_status`], which
/// rejects transitions [`PostStatus::can_transition_to`] does not allow.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a post.
    async fn create_post(&self, post: NewPost) -> VermeerResult<Post>;

    /// Load a post.
    async fn get_post(&self, id: PostId) -> VermeerResult<Option<Post>>;

    /// Move a post to `status`.
    ///
    /// `scheduled_at: Some` replaces the scheduled time, `None` keeps it.
    /// Fails with a conflict when the transition is not allowed.
    async fn update_status(
        &self,
        id: PostId,
        status: PostStatus,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> VermeerResult<Post>;

    /// Replace a post's text.
    async fn update_content(&self, id: PostId, content: &str) -> VermeerResult<Post>;

    /// Replace a post's media.
    async fn replace_media(&self, id: PostId, media: Vec<MediaRef>) -> VermeerResult<Post>;

    /// Posts of `plan_id` whose `scheduled_at` lies in `[from, to]`.
    async fn find_scheduled_between(
        &self,
        plan_id: PlanId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> VermeerResult<Vec<Post>>;

    /// Posts of `plan_id` created at or after `since`.
    async fn find_created_since(
        &self,
        plan_id: PlanId,
        since: DateTime<Utc>,
    ) -> VermeerResult<Vec<Post>>;

    /// Published posts of a channel, newest first.
    async fn recent_published(
        &self,
        channel_id: ChannelId,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> VermeerResult<Vec<Post>>;

    /// `scheduled` posts whose `scheduled_at` is at or before `now`.
    async fn due_scheduled(&self, now: DateTime<Utc>) -> VermeerResult<Vec<Post>>;
}

/// Pending review storage.
#[async_trait]
pub trait PendingReviewRepository: Send + Sync {
    /// Record a pending review. Fails with a conflict if the post already has one.
    async fn create_pending_review(&self, review: PendingReview) -> VermeerResult<()>;

    /// Load the pending review of a post.
    async fn get_pending_review(&self, post_id: PostId) -> VermeerResult<Option<PendingReview>>;

    /// Attach the notification message id.
    async fn set_review_message(&self, post_id: PostId, message_id: MessageId)
    -> VermeerResult<()>;

    /// Delete the pending review of a post, returning whether one existed.
    async fn delete_pending_review(&self, post_id: PostId) -> VermeerResult<bool>;
}

/// Source material storage.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Every unused item of the given sources.
    async fn unused_items(&self, source_ids: &[SourceId]) -> VermeerResult<Vec<SourceItem>>;

    /// The `limit` most recently ingested unused items, newest first.
    async fn recent_unused_items(
        &self,
        source_ids: &[SourceId],
        limit: usize,
    ) -> VermeerResult<Vec<SourceItem>>;

    /// Mark items as used.
    async fn mark_used(&self, item_ids: &[SourceItemId]) -> VermeerResult<()>;
}

/// Channel storage.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Load a channel.
    async fn get_channel(&self, id: ChannelId) -> VermeerResult<Option<Channel>>;
}

/// A store that answers every query the pipeline makes.
pub trait ContentStore:
    PlanRepository + PostRepository + PendingReviewRepository + SourceRepository + ChannelRepository
{
}

impl<T> ContentStore for T where
    T: PlanRepository
        + PostRepository
        + PendingReviewRepository
        + SourceRepository
        + ChannelRepository
{
}
