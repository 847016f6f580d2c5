//! Plan scheduling for Vermeer.
//!
//! [`CronSchedule`] evaluates five-field cron expressions in an IANA
//! timezone. [`PlanScheduler`] keeps one timer per enabled plan and enqueues
//! a plan execution job each time a timer fires.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod expression;
mod registry;

pub use expression::{CronSchedule, validate_schedule};
pub use registry::{BootstrapSummary, PlanScheduler};
