//! mpsc-backed job queue.

use crate::QueueSettings;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;
use vermeer_core::{Job, JobOptions};
use vermeer_error::{QueueError, QueueErrorKind, VermeerResult};
use vermeer_interface::JobQueue;

#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) job: Job,
    pub(crate) options: JobOptions,
}

/// Consumer side of one registered queue, handed to a [`Worker`](crate::Worker).
#[derive(Debug)]
pub struct QueueReceiver {
    pub(crate) name: &'static str,
    pub(crate) settings: QueueSettings,
    pub(crate) rx: mpsc::Receiver<Envelope>,
}

impl QueueReceiver {
    /// Queue name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Delivery settings.
    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }
}

/// Routes jobs to per-queue channels by [`Job::queue_name`].
#[derive(Debug, Default, Clone)]
pub struct ChannelJobQueue {
    senders: HashMap<&'static str, mpsc::Sender<Envelope>>,
}

impl ChannelJobQueue {
    /// Create a queue with no registered channels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named queue and return its consumer side.
    ///
    /// Registering a name twice replaces the earlier channel; its receiver
    /// drains what it already has and then sees the channel close.
    pub fn register(&mut self, name: &'static str, settings: QueueSettings) -> QueueReceiver {
        let (tx, rx) = mpsc::channel(*settings.capacity());
        self.senders.insert(name, tx);
        QueueReceiver { name, settings, rx }
    }

    /// Registered queue names.
    pub fn queue_names(&self) -> Vec<&'static str> {
        self.senders.keys().copied().collect()
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn enqueue(&self, job: Job, options: JobOptions) -> VermeerResult<()> {
        let name = job.queue_name();
        let sender = self
            .senders
            .get(name)
            .ok_or_else(|| QueueError::new(QueueErrorKind::UnknownQueue(name.to_string())))?;

        sender
            .send(Envelope { job, options })
            .await
            .map_err(|_| QueueError::new(QueueErrorKind::Closed(name.to_string())))?;

        debug!(queue = name, "Job enqueued");
        Ok(())
    }
}
