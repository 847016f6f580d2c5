//! Plan execution and publishing for Vermeer.
//!
//! A [`PlanExecutor`] consumes plan execution jobs: it runs the
//! [`DuplicateGuard`], generates a post, stores its image and creates the post
//! in the state [`initial_state`] dictates for the plan's publish mode. A
//! [`PublishJobHandler`] consumes publish jobs, and the
//! [`ScheduledPostDispatcher`] promotes due `scheduled` posts to publishing.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod dispatcher;
mod executor;
mod guard;
mod lifecycle;
mod metrics;
mod publisher;

pub use dispatcher::ScheduledPostDispatcher;
pub use executor::{ExecutionOutcome, ExecutorSettings, PlanExecutor};
pub use guard::{DuplicateGuard, DuplicateMatch, GuardCheck, GuardSettings};
pub use lifecycle::{CreationEffect, InitialState, initial_state};
pub use metrics::{MetricsSnapshot, PipelineMetrics, PostsCreatedSnapshot};
pub use publisher::{PublishJobHandler, PublishOutcome};
