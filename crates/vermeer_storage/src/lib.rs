//! Storage backends for Vermeer.
//!
//! - [`InMemoryStore`]: every record repository over `RwLock<HashMap>`s
//! - [`FileSystemObjectStore`]: content-addressed media under a base directory
//! - [`InMemoryObjectStore`]: media kept in memory
//! - [`RecordingJobQueue`]: a job queue that only remembers what was enqueued

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
mod object_store;
mod queue;

pub use memory::InMemoryStore;
pub use object_store::{FileSystemObjectStore, InMemoryObjectStore};
pub use queue::RecordingJobQueue;
