//! In-memory record store.
//!
//! Holds plans, posts, pending reviews, source items and channels in
//! `HashMap`s behind `RwLock`s. All data is lost when the store is dropped.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use vermeer_core::{
    Channel, ChannelId, ContentPlan, MediaRef, MessageId, NewPost, PendingReview, PlanId, Post,
    PostId, PostStatus, SourceId, SourceItem, SourceItemId,
};
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};
use vermeer_interface::{
    ChannelRepository, PendingReviewRepository, PlanRepository, PostRepository, SourceRepository,
};

/// In-memory implementation of every record repository.
///
/// Cloning shares the underlying maps.
///
/// # Example
/// ```
/// use vermeer_storage::InMemoryStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = InMemoryStore::new();
///     assert!(store.posts().await.is_empty());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    plans: Arc<RwLock<HashMap<PlanId, ContentPlan>>>,
    posts: Arc<RwLock<HashMap<PostId, Post>>>,
    reviews: Arc<RwLock<HashMap<PostId, PendingReview>>>,
    items: Arc<RwLock<HashMap<SourceItemId, SourceItem>>>,
    channels: Arc<RwLock<HashMap<ChannelId, Channel>>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a channel.
    pub async fn insert_channel(&self, channel: Channel) {
        self.channels.write().await.insert(channel.id, channel);
    }

    /// Insert or replace source items.
    pub async fn insert_items(&self, items: impl IntoIterator<Item = SourceItem>) {
        let mut guard = self.items.write().await;
        for item in items {
            guard.insert(item.id, item);
        }
    }

    /// Insert a post as-is, bypassing lifecycle checks (for seeding).
    pub async fn insert_post(&self, post: Post) {
        self.posts.write().await.insert(post.id, post);
    }

    /// Snapshot of every post, oldest first.
    pub async fn posts(&self) -> Vec<Post> {
        let mut posts: Vec<_> = self.posts.read().await.values().cloned().collect();
        posts.sort_by_key(|p| p.created_at);
        posts
    }

    /// Snapshot of every pending review.
    pub async fn pending_reviews(&self) -> Vec<PendingReview> {
        self.reviews.read().await.values().cloned().collect()
    }

    /// Look up a source item.
    pub async fn item(&self, id: SourceItemId) -> Option<SourceItem> {
        self.items.read().await.get(&id).cloned()
    }

    async fn modify_post(
        &self,
        id: PostId,
        change: impl FnOnce(&mut Post) -> VermeerResult<()>,
    ) -> VermeerResult<Post> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(&id)
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(format!("post {id}"))))?;
        change(post)?;
        post.updated_at = Utc::now();
        Ok(post.clone())
    }
}

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn get_plan(&self, id: PlanId) -> VermeerResult<Option<ContentPlan>> {
        Ok(self.plans.read().await.get(&id).cloned())
    }

    async fn list_plans(&self) -> VermeerResult<Vec<ContentPlan>> {
        Ok(self.plans.read().await.values().cloned().collect())
    }

    async fn save_plan(&self, plan: ContentPlan) -> VermeerResult<()> {
        self.plans.write().await.insert(plan.id, plan);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, post: NewPost) -> VermeerResult<Post> {
        let post = post.into_post();
        if !post.schedule_is_consistent() {
            return Err(StorageError::new(StorageErrorKind::Conflict(format!(
                "{} post without scheduled_at",
                post.status
            )))
            .into());
        }
        self.posts.write().await.insert(post.id, post.clone());
        tracing::debug!(post_id = %post.id, status = %post.status, "Created post");
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> VermeerResult<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: PostId,
        status: PostStatus,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> VermeerResult<Post> {
        self.modify_post(id, |post| {
            if !post.status.can_transition_to(status) {
                return Err(StorageError::new(StorageErrorKind::Conflict(format!(
                    "post {} cannot move from {} to {}",
                    post.id, post.status, status
                )))
                .into());
            }
            let scheduled_at = scheduled_at.or(post.scheduled_at);
            if status.requires_schedule() && scheduled_at.is_none() {
                return Err(StorageError::new(StorageErrorKind::Conflict(format!(
                    "post {} needs a scheduled time to become {}",
                    post.id, status
                )))
                .into());
            }
            post.status = status;
            post.scheduled_at = scheduled_at;
            if status == PostStatus::Published {
                post.published_at = Some(Utc::now());
            }
            Ok(())
        })
        .await
    }

    async fn update_content(&self, id: PostId, content: &str) -> VermeerResult<Post> {
        self.modify_post(id, |post| {
            post.content = content.to_string();
            Ok(())
        })
        .await
    }

    async fn replace_media(&self, id: PostId, media: Vec<MediaRef>) -> VermeerResult<Post> {
        self.modify_post(id, |post| {
            post.image_generated = !media.is_empty();
            post.media = media;
            Ok(())
        })
        .await
    }

    async fn find_scheduled_between(
        &self,
        plan_id: PlanId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> VermeerResult<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.plan_id == Some(plan_id))
            .filter(|p| p.scheduled_at.is_some_and(|at| from <= at && at <= to))
            .cloned()
            .collect())
    }

    async fn find_created_since(
        &self,
        plan_id: PlanId,
        since: DateTime<Utc>,
    ) -> VermeerResult<Vec<Post>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.plan_id == Some(plan_id) && p.created_at >= since)
            .cloned()
            .collect())
    }

    async fn recent_published(
        &self,
        channel_id: ChannelId,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> VermeerResult<Vec<Post>> {
        let mut published: Vec<_> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.channel_id == channel_id && p.status == PostStatus::Published)
            .filter(|p| match (since, p.published_at) {
                (Some(since), Some(at)) => at >= since,
                (Some(_), None) => false,
                (None, _) => true,
            })
            .cloned()
            .collect();
        published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        published.truncate(limit);
        Ok(published)
    }

    async fn due_scheduled(&self, now: DateTime<Utc>) -> VermeerResult<Vec<Post>> {
        let mut due: Vec<_> = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| p.status == PostStatus::Scheduled)
            .filter(|p| p.scheduled_at.is_some_and(|at| at <= now))
            .cloned()
            .collect();
        due.sort_by_key(|p| p.scheduled_at);
        Ok(due)
    }
}

#[async_trait]
impl PendingReviewRepository for InMemoryStore {
    async fn create_pending_review(&self, review: PendingReview) -> VermeerResult<()> {
        let mut reviews = self.reviews.write().await;
        if reviews.contains_key(&review.post_id) {
            return Err(StorageError::new(StorageErrorKind::Conflict(format!(
                "post {} already has a pending review",
                review.post_id
            )))
            .into());
        }
        reviews.insert(review.post_id, review);
        Ok(())
    }

    async fn get_pending_review(&self, post_id: PostId) -> VermeerResult<Option<PendingReview>> {
        Ok(self.reviews.read().await.get(&post_id).cloned())
    }

    async fn set_review_message(
        &self,
        post_id: PostId,
        message_id: MessageId,
    ) -> VermeerResult<()> {
        let mut reviews = self.reviews.write().await;
        let review = reviews.get_mut(&post_id).ok_or_else(|| {
            StorageError::new(StorageErrorKind::NotFound(format!(
                "pending review for post {post_id}"
            )))
        })?;
        review.message_id = Some(message_id);
        Ok(())
    }

    async fn delete_pending_review(&self, post_id: PostId) -> VermeerResult<bool> {
        Ok(self.reviews.write().await.remove(&post_id).is_some())
    }
}

#[async_trait]
impl SourceRepository for InMemoryStore {
    async fn unused_items(&self, source_ids: &[SourceId]) -> VermeerResult<Vec<SourceItem>> {
        let mut items: Vec<_> = self
            .items
            .read()
            .await
            .values()
            .filter(|i| !i.used && source_ids.contains(&i.source_id))
            .cloned()
            .collect();
        // Oldest first.
        items.sort_by_key(|i| (i.ingested_at, i.id));
        Ok(items)
    }

    async fn recent_unused_items(
        &self,
        source_ids: &[SourceId],
        limit: usize,
    ) -> VermeerResult<Vec<SourceItem>> {
        let mut items = self.unused_items(source_ids).await?;
        items.reverse();
        items.truncate(limit);
        Ok(items)
    }

    async fn mark_used(&self, item_ids: &[SourceItemId]) -> VermeerResult<()> {
        let mut items = self.items.write().await;
        for id in item_ids {
            if let Some(item) = items.get_mut(id) {
                item.used = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelRepository for InMemoryStore {
    async fn get_channel(&self, id: ChannelId) -> VermeerResult<Option<Channel>> {
        Ok(self.channels.read().await.get(&id).cloned())
    }
}
