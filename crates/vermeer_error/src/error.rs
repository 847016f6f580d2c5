//! Top-level error wrapper types.

use crate::{
    ConfigError, GenerationError, NotificationError, QueueError, ReviewError, ScheduleError,
    StorageError, StorageErrorKind,
};

/// Every error condition the pipeline can surface.
///
/// # Examples
///
/// ```
/// use vermeer_error::{VermeerError, ConfigError};
///
/// let err: VermeerError = ConfigError::new("missing [queues]").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum VermeerErrorKind {
    /// Invalid cron expression or timezone
    #[from(ScheduleError)]
    Schedule(ScheduleError),
    /// Text generation failed or had nothing to work with
    #[from(GenerationError)]
    Generation(GenerationError),
    /// Record or object storage failure
    #[from(StorageError)]
    Storage(StorageError),
    /// Messaging transport failure
    #[from(NotificationError)]
    Notification(NotificationError),
    /// Job queue failure
    #[from(QueueError)]
    Queue(QueueError),
    /// Review protocol failure
    #[from(ReviewError)]
    Review(ReviewError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Vermeer error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Vermeer Error: {}", _0)]
pub struct VermeerError(Box<VermeerErrorKind>);

impl VermeerError {
    /// Create a new error from a kind.
    pub fn new(kind: VermeerErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &VermeerErrorKind {
        &self.0
    }

    /// Whether a job that failed with this error should be attempted again.
    ///
    /// Provider failures, storage backend hiccups and transport errors are
    /// transient. Bad schedules, empty plans and missing records are not.
    pub fn is_retryable(&self) -> bool {
        match self.kind() {
            VermeerErrorKind::Generation(e) => e.kind.is_retryable(),
            VermeerErrorKind::Storage(e) => {
                matches!(e.kind(), StorageErrorKind::Backend(_) | StorageErrorKind::Io(_))
            }
            VermeerErrorKind::Notification(_) => true,
            VermeerErrorKind::Schedule(_)
            | VermeerErrorKind::Queue(_)
            | VermeerErrorKind::Review(_)
            | VermeerErrorKind::Config(_) => false,
        }
    }
}

// Generic From implementation for any type that converts to VermeerErrorKind
impl<T> From<T> for VermeerError
where
    T: Into<VermeerErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Vermeer operations.
pub type VermeerResult<T> = std::result::Result<T, VermeerError>;
