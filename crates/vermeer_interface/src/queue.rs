//! Job queue capability.

use async_trait::async_trait;
use vermeer_core::{Job, JobOptions};
use vermeer_error::VermeerResult;

/// At-least-once job queue.
///
/// Jobs are routed to the queue named by [`Job::queue_name`].
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueue a job.
    async fn enqueue(&self, job: Job, options: JobOptions) -> VermeerResult<()>;
}
