//! A job queue that records instead of delivering.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use vermeer_core::{Job, JobOptions, PlanExecutionJob, PublishJob};
use vermeer_error::VermeerResult;
use vermeer_interface::JobQueue;

/// Remembers every enqueued job, in order.
///
/// Used where delivery is driven by hand, and by tests asserting on what the
/// pipeline enqueued.
#[derive(Debug, Clone, Default)]
pub struct RecordingJobQueue {
    jobs: Arc<RwLock<Vec<(Job, JobOptions)>>>,
}

impl RecordingJobQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job enqueued so far.
    pub async fn jobs(&self) -> Vec<Job> {
        self.jobs.read().await.iter().map(|(job, _)| *job).collect()
    }

    /// Every job with its options.
    pub async fn entries(&self) -> Vec<(Job, JobOptions)> {
        self.jobs.read().await.clone()
    }

    /// Enqueued publish jobs.
    pub async fn publish_jobs(&self) -> Vec<PublishJob> {
        self.jobs
            .read()
            .await
            .iter()
            .filter_map(|(job, _)| match job {
                Job::Publish(publish) => Some(*publish),
                Job::PlanExecution(_) => None,
            })
            .collect()
    }

    /// Enqueued plan execution jobs.
    pub async fn plan_jobs(&self) -> Vec<PlanExecutionJob> {
        self.jobs
            .read()
            .await
            .iter()
            .filter_map(|(job, _)| match job {
                Job::PlanExecution(execution) => Some(*execution),
                Job::Publish(_) => None,
            })
            .collect()
    }

    /// Drain the recorded jobs.
    pub async fn take(&self) -> Vec<Job> {
        self.jobs
            .write()
            .await
            .drain(..)
            .map(|(job, _)| job)
            .collect()
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn enqueue(&self, job: Job, options: JobOptions) -> VermeerResult<()> {
        tracing::debug!(queue = job.queue_name(), "Recorded job");
        self.jobs.write().await.push((job, options));
        Ok(())
    }
}
