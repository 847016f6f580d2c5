//! Units of work passed through the job queues.

use crate::{ChannelId, PlanId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue that carries [`PlanExecutionJob`]s.
pub const PLAN_EXECUTION_QUEUE: &str = "plan-execution";

/// Queue that carries [`PublishJob`]s.
pub const PUBLISH_QUEUE: &str = "publish";

/// "Plan P should attempt to produce one post now."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanExecutionJob {
    /// Plan to execute
    pub plan_id: PlanId,
    /// Cron slot the scheduler fired for; `None` for manual runs
    pub nominal_time: Option<DateTime<Utc>>,
}

impl PlanExecutionJob {
    /// A job fired by the scheduler for the slot at `nominal_time`.
    pub fn scheduled(plan_id: PlanId, nominal_time: DateTime<Utc>) -> Self {
        Self {
            plan_id,
            nominal_time: Some(nominal_time),
        }
    }

    /// A manual "generate now" job.
    pub fn manual(plan_id: PlanId) -> Self {
        Self {
            plan_id,
            nominal_time: None,
        }
    }
}

/// "Publish post P to its channel."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishJob {
    /// Post to publish
    pub post_id: PostId,
    /// Channel the post goes to
    pub channel_id: ChannelId,
}

/// Any job the pipeline enqueues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Job {
    /// Plan execution
    PlanExecution(PlanExecutionJob),
    /// Publish
    Publish(PublishJob),
}

impl Job {
    /// Name of the queue this job belongs on.
    pub fn queue_name(&self) -> &'static str {
        match self {
            Job::PlanExecution(_) => PLAN_EXECUTION_QUEUE,
            Job::Publish(_) => PUBLISH_QUEUE,
        }
    }
}

/// Per-job delivery options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobOptions {
    /// Overrides the queue's attempt budget
    pub attempts: Option<usize>,
    /// Hold the job back for this long before the first attempt
    pub delay: Option<Duration>,
}

impl JobOptions {
    /// Options with an explicit attempt budget.
    pub fn with_attempts(attempts: usize) -> Self {
        Self {
            attempts: Some(attempts),
            ..Self::default()
        }
    }
}
