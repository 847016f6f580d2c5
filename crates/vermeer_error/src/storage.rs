//! Storage error types.

/// Specific error conditions for record and object storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorageErrorKind {
    /// Record or object not found
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Write rejected because it conflicts with current state
    #[display("Conflict: {}", _0)]
    Conflict(String),
    /// Filesystem I/O failure
    #[display("I/O error: {}", _0)]
    Io(String),
    /// Backend failure (connection lost, timeout)
    #[display("Storage backend error: {}", _0)]
    Backend(String),
}

/// Storage error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    kind: StorageErrorKind,
    line: u32,
    file: &'static str,
}

impl StorageError {
    /// Create a new storage error with caller location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorageErrorKind {
        &self.kind
    }
}

impl From<std::io::Error> for StorageError {
    #[track_caller]
    fn from(e: std::io::Error) -> Self {
        Self::new(StorageErrorKind::Io(e.to_string()))
    }
}
