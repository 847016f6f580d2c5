//! Error types for the Vermeer content pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vermeer_error::{ScheduleError, ScheduleErrorKind, VermeerResult};
//!
//! fn parse() -> VermeerResult<()> {
//!     Err(ScheduleError::new(ScheduleErrorKind::InvalidCron {
//!         expression: "bad".to_string(),
//!         reason: "expected 5 fields".to_string(),
//!     }))?
//! }
//!
//! assert!(parse().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod generation;
mod notification;
mod queue;
mod review;
mod schedule;
mod storage;

pub use config::ConfigError;
pub use error::{VermeerError, VermeerErrorKind, VermeerResult};
pub use generation::{GenerationError, GenerationErrorKind};
pub use notification::{NotificationError, NotificationErrorKind};
pub use queue::{QueueError, QueueErrorKind};
pub use review::{ReviewError, ReviewErrorKind};
pub use schedule::{ScheduleError, ScheduleErrorKind};
pub use storage::{StorageError, StorageErrorKind};
