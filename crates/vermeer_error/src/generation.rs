//! Generation error types.

/// Specific error conditions for post generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GenerationErrorKind {
    /// The plan has neither source material nor a prompt template
    #[display("No candidate content for plan {}", _0)]
    NoCandidateContent(String),
    /// The text provider failed (transport, rate limit, refusal)
    #[display("Generation provider error: {}", _0)]
    Provider(String),
    /// The text provider returned an empty result
    #[display("Generation provider returned an empty result")]
    EmptyResult,
    /// The provider call exceeded its deadline
    #[display("Generation provider timed out after {}s", _0)]
    Timeout(u64),
}

impl GenerationErrorKind {
    /// Whether a job queue should retry the failed execution.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::EmptyResult | Self::Timeout(_))
    }
}

/// Generation error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Generation Error: {} at line {} in {}", kind, line, file)]
pub struct GenerationError {
    /// The specific error condition
    pub kind: GenerationErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
