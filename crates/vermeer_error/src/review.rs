//! Review protocol errors.

/// Specific error conditions for the review/edit protocol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ReviewErrorKind {
    /// Callback payload could not be decoded
    #[display("Malformed callback data: {}", _0)]
    MalformedCallback(String),
    /// The text revision call failed
    #[display("Text revision failed: {}", _0)]
    RevisionFailed(String),
}

/// Review error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Review Error: {} at line {} in {}", kind, line, file)]
pub struct ReviewError {
    /// The specific error condition
    pub kind: ReviewErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ReviewError {
    /// Create a new ReviewError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ReviewErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
