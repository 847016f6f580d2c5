//! Counters for plan executions and publishing.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use vermeer_core::PublishMode;

/// Shared pipeline counters. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    inner: Arc<PipelineMetricsInner>,
}

#[derive(Debug, Default)]
struct PipelineMetricsInner {
    executions: AtomicU64,
    duplicate_skips: AtomicU64,
    empty_plan_skips: AtomicU64,
    generation_failures: AtomicU64,
    image_soft_failures: AtomicU64,

    // Posts created, per publish mode
    created_auto_publish: AtomicU64,
    created_review_first: AtomicU64,
    created_draft_only: AtomicU64,

    notifications_failed: AtomicU64,
    publishes_succeeded: AtomicU64,
    publishes_failed: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

fn read(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

impl PipelineMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a plan execution attempt.
    pub fn record_execution(&self) {
        bump(&self.inner.executions);
    }

    /// Records a run skipped by the duplicate guard.
    pub fn record_duplicate_skip(&self) {
        bump(&self.inner.duplicate_skips);
    }

    /// Records a run skipped for lack of source material.
    pub fn record_empty_plan(&self) {
        bump(&self.inner.empty_plan_skips);
    }

    /// Records a failed text generation.
    pub fn record_generation_failure(&self) {
        bump(&self.inner.generation_failures);
    }

    /// Records a post that went out without its image.
    pub fn record_image_soft_failure(&self) {
        bump(&self.inner.image_soft_failures);
    }

    /// Records a created post.
    pub fn record_post_created(&self, mode: PublishMode) {
        match mode {
            PublishMode::AutoPublish => bump(&self.inner.created_auto_publish),
            PublishMode::ReviewFirst => bump(&self.inner.created_review_first),
            PublishMode::DraftOnly => bump(&self.inner.created_draft_only),
        }
    }

    /// Records a review notification that could not be sent.
    pub fn record_notification_failure(&self) {
        bump(&self.inner.notifications_failed);
    }

    /// Records a published post.
    pub fn record_publish_success(&self) {
        bump(&self.inner.publishes_succeeded);
    }

    /// Records a post that failed to publish for good.
    pub fn record_publish_failure(&self) {
        bump(&self.inner.publishes_failed);
    }

    /// Gets plan execution count.
    pub fn executions(&self) -> u64 {
        read(&self.inner.executions)
    }

    /// Gets duplicate skip count.
    pub fn duplicate_skips(&self) -> u64 {
        read(&self.inner.duplicate_skips)
    }

    /// Gets total created posts.
    pub fn posts_created(&self) -> u64 {
        read(&self.inner.created_auto_publish)
            + read(&self.inner.created_review_first)
            + read(&self.inner.created_draft_only)
    }

    /// Creates a serializable snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            executions: read(&inner.executions),
            duplicate_skips: read(&inner.duplicate_skips),
            empty_plan_skips: read(&inner.empty_plan_skips),
            generation_failures: read(&inner.generation_failures),
            image_soft_failures: read(&inner.image_soft_failures),
            posts_created: PostsCreatedSnapshot {
                auto_publish: read(&inner.created_auto_publish),
                review_first: read(&inner.created_review_first),
                draft_only: read(&inner.created_draft_only),
            },
            notifications_failed: read(&inner.notifications_failed),
            publishes_succeeded: read(&inner.publishes_succeeded),
            publishes_failed: read(&inner.publishes_failed),
        }
    }
}

/// Posts created per publish mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PostsCreatedSnapshot {
    /// `auto_publish` posts
    pub auto_publish: u64,
    /// `review_first` posts
    pub review_first: u64,
    /// `draft_only` posts
    pub draft_only: u64,
}

/// Serializable snapshot of pipeline metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Plan execution attempts
    pub executions: u64,
    /// Runs skipped as duplicates
    pub duplicate_skips: u64,
    /// Runs with nothing to generate from
    pub empty_plan_skips: u64,
    /// Failed text generations
    pub generation_failures: u64,
    /// Posts created without their image
    pub image_soft_failures: u64,
    /// Created posts
    pub posts_created: PostsCreatedSnapshot,
    /// Review notifications that could not be sent
    pub notifications_failed: u64,
    /// Published posts
    pub publishes_succeeded: u64,
    /// Posts that failed to publish
    pub publishes_failed: u64,
}
