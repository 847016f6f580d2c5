//! Notification and publishing transport errors.

/// Specific error conditions for the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum NotificationErrorKind {
    /// Sending a new message failed
    #[display("Failed to send message: {}", _0)]
    SendFailed(String),
    /// Editing an existing message failed
    #[display("Failed to edit message {}: {}", message_id, reason)]
    EditFailed {
        /// Message that could not be edited
        message_id: String,
        /// Transport error message
        reason: String,
    },
    /// The transport call exceeded its deadline
    #[display("Messaging transport timed out after {}s", _0)]
    Timeout(u64),
}

/// Notification error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Notification Error: {} at line {} in {}", kind, line, file)]
pub struct NotificationError {
    /// The specific error condition
    pub kind: NotificationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl NotificationError {
    /// Create a new NotificationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: NotificationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
