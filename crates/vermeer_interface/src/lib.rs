//! Trait definitions for the Vermeer content pipeline.
//!
//! Everything the pipeline consumes but does not own lives behind a trait
//! here: the text and image providers, the rasterizer, object storage, the
//! messaging transport, the job queue and the record store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generation;
mod notify;
mod queue;
mod repository;
mod storage;
mod timeout;

pub use generation::{ImageGenerator, Rasterizer, TextGenerator, VectorImageGenerator};
pub use notify::{Publisher, ReviewNotification, ReviewNotifier};
pub use queue::JobQueue;
pub use repository::{
    ChannelRepository, ContentStore, PendingReviewRepository, PlanRepository, PostRepository,
    SourceRepository,
};
pub use storage::ObjectStore;
pub use timeout::Timed;
