//! Publish jobs.

use crate::PipelineMetrics;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{Job, MessageId, PostStatus, PublishJob};
use vermeer_error::{StorageError, StorageErrorKind, VermeerError, VermeerResult};
use vermeer_interface::{ContentStore, Publisher};
use vermeer_queue::JobHandler;

/// How a publish job ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The post went out
    Published(MessageId),
    /// The post is not `publishing` (already handled or withdrawn)
    NotPublishing(PostStatus),
    /// The post no longer exists
    Missing,
}

/// Publishes posts that a publish job points at.
///
/// Safe under redelivery: only a post still in `publishing` is sent.
pub struct PublishJobHandler<S> {
    store: Arc<S>,
    publisher: Arc<dyn Publisher>,
    metrics: PipelineMetrics,
}

impl<S> std::fmt::Debug for PublishJobHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishJobHandler").finish_non_exhaustive()
    }
}

impl<S: ContentStore + 'static> PublishJobHandler<S> {
    /// Create a handler.
    pub fn new(store: Arc<S>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            store,
            publisher,
            metrics: PipelineMetrics::new(),
        }
    }

    /// Count into these metrics.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Publish the job's post.
    #[instrument(skip(self), fields(post_id = %job.post_id, channel_id = %job.channel_id))]
    pub async fn publish(&self, job: PublishJob) -> VermeerResult<PublishOutcome> {
        let Some(post) = self.store.get_post(job.post_id).await? else {
            warn!("Post no longer exists");
            return Ok(PublishOutcome::Missing);
        };
        if post.status != PostStatus::Publishing {
            debug!(status = %post.status, "Post is not publishing; nothing to do");
            return Ok(PublishOutcome::NotPublishing(post.status));
        }

        let channel = self
            .store
            .get_channel(job.channel_id)
            .await?
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(format!(
                    "channel {}",
                    job.channel_id
                )))
            })?;

        let message_id = self.publisher.publish(&channel, &post).await?;
        self.store
            .update_status(post.id, PostStatus::Published, None)
            .await?;
        self.metrics.record_publish_success();
        info!(%message_id, "Post published");
        Ok(PublishOutcome::Published(message_id))
    }
}

#[async_trait]
impl<S: ContentStore + 'static> JobHandler for PublishJobHandler<S> {
    async fn handle(&self, job: Job) -> VermeerResult<()> {
        match job {
            Job::Publish(job) => self.publish(job).await.map(|_| ()),
            Job::PlanExecution(job) => {
                warn!(plan_id = %job.plan_id, "Plan execution job on the publish queue; dropped");
                Ok(())
            }
        }
    }

    async fn on_exhausted(&self, job: Job, error: &VermeerError) {
        let Job::Publish(job) = job else {
            return;
        };
        error!(post_id = %job.post_id, error = %error, "Publishing failed for good");
        self.metrics.record_publish_failure();
        if let Err(e) = self
            .store
            .update_status(job.post_id, PostStatus::Failed, None)
            .await
        {
            error!(post_id = %job.post_id, error = %e, "Could not mark post failed");
        }
    }
}
