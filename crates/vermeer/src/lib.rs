//! Vermeer - scheduled content generation with human review.
//!
//! Content plans fire on cron schedules, generate a post (text plus an
//! optional image) from unused source material, and route it by publish mode:
//! straight to the publish queue, to a human reviewer, or into drafts.
//! Reviewers approve, reject, schedule or edit posts through inline controls.
//!
//! # Architecture
//!
//! - `vermeer_error` - Error types
//! - `vermeer_core` - Plans, posts, reviews, jobs
//! - `vermeer_interface` - Repository and provider traits
//! - `vermeer_storage` - In-memory records and object storage
//! - `vermeer_scheduler` - Cron evaluation and plan timers
//! - `vermeer_queue` - In-process job queues with retry
//! - `vermeer_generation` - Source selection, text and image generation
//! - `vermeer_pipeline` - Duplicate guard, plan execution, publishing
//! - `vermeer_review` - Review and edit session protocol
//!
//! This crate loads configuration, installs logging, wires a [`Runtime`] and
//! re-exports the rest for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
mod config;
mod logging;
mod plan_file;
mod runtime;

pub use config::{
    DispatcherConfig, GenerationConfig, LoggingConfig, QueueConfig, QueuesConfig, StorageConfig,
    VermeerConfig,
};
pub use logging::init_logging;
pub use plan_file::{load_plans, parse_plans};
pub use runtime::{Providers, Runtime};

pub use vermeer_core::*;
pub use vermeer_error::*;
pub use vermeer_generation::{GenerationOrchestrator, ImageSynthesizer};
pub use vermeer_interface::*;
pub use vermeer_pipeline::{
    DuplicateGuard, ExecutionOutcome, ExecutorSettings, GuardSettings, MetricsSnapshot,
    PipelineMetrics, PlanExecutor, PublishJobHandler, PublishOutcome,
};
pub use vermeer_queue::{ChannelJobQueue, JobHandler, QueueSettings, Worker};
pub use vermeer_review::{ReviewService, ReviewSettings};
pub use vermeer_scheduler::{CronSchedule, PlanScheduler, validate_schedule};
pub use vermeer_storage::{FileSystemObjectStore, InMemoryObjectStore, InMemoryStore};
