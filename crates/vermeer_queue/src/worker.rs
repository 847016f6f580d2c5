//! Queue consumers.

use crate::channel_queue::{Envelope, QueueReceiver};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, error, info, warn};
use vermeer_core::Job;
use vermeer_error::{VermeerError, VermeerResult};

/// Runs the jobs of one queue.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Run a job once.
    ///
    /// Errors for which [`VermeerError::is_retryable`] holds are retried with
    /// backoff; any other error fails the job immediately.
    async fn handle(&self, job: Job) -> VermeerResult<()>;

    /// Called once when a job has failed for good.
    async fn on_exhausted(&self, _job: Job, _error: &VermeerError) {}
}

/// A spawned consumer of one queue.
#[derive(Debug)]
pub struct Worker {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Worker {
    /// Start draining `receiver` into `handler`.
    pub fn spawn(receiver: QueueReceiver, handler: Arc<dyn JobHandler>) -> Self {
        let name = receiver.name;
        let handle = tokio::spawn(run(receiver, handler));
        info!(queue = name, "Worker started");
        Self { name, handle }
    }

    /// Queue this worker drains.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Stop taking new jobs. Jobs already running finish on their own.
    pub fn shutdown(self) {
        self.handle.abort();
        info!(queue = self.name, "Worker stopped");
    }
}

async fn run(receiver: QueueReceiver, handler: Arc<dyn JobHandler>) {
    let QueueReceiver {
        name,
        settings,
        mut rx,
    } = receiver;
    let permits = Arc::new(Semaphore::new(*settings.concurrency()));

    while let Some(Envelope { job, options }) = rx.recv().await {
        let permits = Arc::clone(&permits);
        let handler = Arc::clone(&handler);
        let attempts = options.attempts.unwrap_or(*settings.attempts()).max(1);
        let backoff = settings.backoff(attempts);

        tokio::spawn(async move {
            if let Some(delay) = options.delay {
                tokio::time::sleep(delay).await;
            }
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let mut attempt = 0usize;
            let result = Retry::spawn(backoff, || {
                attempt += 1;
                let current = attempt;
                let handler = Arc::clone(&handler);
                async move {
                    match handler.handle(job).await {
                        Ok(()) => Ok(()),
                        Err(e) if e.is_retryable() && current < attempts => {
                            warn!(queue = name, attempt = current, error = %e, "Job failed, will retry");
                            Err(RetryError::Transient {
                                err: e,
                                retry_after: None,
                            })
                        }
                        Err(e) => Err(RetryError::Permanent(e)),
                    }
                }
            })
            .await;

            match result {
                Ok(()) => debug!(queue = name, attempts = attempt, "Job completed"),
                Err(e) => {
                    error!(queue = name, attempts = attempt, error = %e, "Job failed");
                    handler.on_exhausted(job, &e).await;
                }
            }
        });
    }

    debug!(queue = name, "Queue closed, worker exiting");
}
