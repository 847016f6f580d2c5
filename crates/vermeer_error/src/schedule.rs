//! Schedule error types.

/// Specific error conditions for plan scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ScheduleErrorKind {
    /// The cron expression is not a valid five-field expression
    #[display("Invalid cron expression '{}': {}", expression, reason)]
    InvalidCron {
        /// The rejected expression
        expression: String,
        /// Why it was rejected
        reason: String,
    },
    /// The timezone name is not a known IANA zone
    #[display("Invalid timezone '{}'", _0)]
    InvalidTimezone(String),
    /// The expression is valid but never fires again
    #[display("Cron expression '{}' has no upcoming run", _0)]
    NoUpcomingRun(String),
}

/// Schedule error with location tracking.
///
/// # Examples
///
/// ```
/// use vermeer_error::{ScheduleError, ScheduleErrorKind};
///
/// let err = ScheduleError::new(ScheduleErrorKind::InvalidTimezone("Mars/Olympus".into()));
/// assert!(format!("{}", err).contains("Mars/Olympus"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schedule Error: {} at line {} in {}", kind, line, file)]
pub struct ScheduleError {
    /// The specific error condition
    pub kind: ScheduleErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ScheduleError {
    /// Create a new ScheduleError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScheduleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
