//! Job queue errors.

/// Specific error conditions for the job queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum QueueErrorKind {
    /// The queue's consumer side has shut down
    #[display("Queue '{}' is closed", _0)]
    Closed(String),
    /// No queue is registered under this name
    #[display("Unknown queue '{}'", _0)]
    UnknownQueue(String),
    /// A job used up its attempt budget
    #[display("Job on queue '{}' failed after {} attempts: {}", queue, attempts, reason)]
    Exhausted {
        /// Queue name
        queue: String,
        /// Attempts made
        attempts: usize,
        /// Last error message
        reason: String,
    },
}

/// Queue error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Queue Error: {} at line {} in {}", kind, line, file)]
pub struct QueueError {
    /// The specific error condition
    pub kind: QueueErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl QueueError {
    /// Create a new QueueError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: QueueErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
