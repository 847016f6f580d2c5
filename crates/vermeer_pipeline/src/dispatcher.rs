//! Promotes due scheduled posts to publishing.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{Job, JobOptions, PostStatus, PublishJob};
use vermeer_error::VermeerResult;
use vermeer_interface::{ContentStore, JobQueue};

/// Polls for `scheduled` posts whose time has come and hands them to the
/// publish queue.
pub struct ScheduledPostDispatcher<S> {
    store: Arc<S>,
    queue: Arc<dyn JobQueue>,
    poll_interval: Duration,
}

impl<S> std::fmt::Debug for ScheduledPostDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledPostDispatcher")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl<S: ContentStore + 'static> ScheduledPostDispatcher<S> {
    /// Create a dispatcher polling every `poll_interval`.
    pub fn new(store: Arc<S>, queue: Arc<dyn JobQueue>, poll_interval: Duration) -> Self {
        Self {
            store,
            queue,
            poll_interval,
        }
    }

    /// Dispatch every post due at `now`. Returns how many were handed over.
    ///
    /// A post that cannot be moved (another writer got there first) is
    /// skipped.
    #[instrument(skip(self))]
    pub async fn tick(&self, now: DateTime<Utc>) -> VermeerResult<usize> {
        let due = self.store.due_scheduled(now).await?;
        let mut dispatched = 0;
        for post in due {
            if let Err(e) = self
                .store
                .update_status(post.id, PostStatus::Publishing, None)
                .await
            {
                warn!(post_id = %post.id, error = %e, "Could not move scheduled post");
                continue;
            }
            let job = PublishJob {
                post_id: post.id,
                channel_id: post.channel_id,
            };
            self.queue
                .enqueue(Job::from(job), JobOptions::default())
                .await?;
            debug!(post_id = %post.id, "Scheduled post dispatched");
            dispatched += 1;
        }
        if dispatched > 0 {
            info!(dispatched, "Dispatched scheduled posts");
        }
        Ok(dispatched)
    }

    /// Poll forever on a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.poll_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            info!(poll_interval = ?self.poll_interval, "Scheduled post dispatcher started");
            loop {
                interval.tick().await;
                if let Err(e) = self.tick(Utc::now()).await {
                    error!(error = %e, "Dispatch pass failed");
                }
            }
        })
    }
}
