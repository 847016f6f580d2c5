//! Core data types for the Vermeer content scheduling pipeline.
//!
//! This crate provides the records shared by every Vermeer component:
//! content plans, generated posts, pending reviews, review edit sessions,
//! source material, channel context and the jobs passed between workers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod callback;
mod channel;
mod generation;
mod ids;
mod job;
mod media;
mod plan;
mod post;
mod review;
mod source;

pub use callback::{CallbackData, InlineControl, ReviewAction, edit_controls, review_controls};
pub use channel::{Channel, ChannelContext, Persona, StoryArc};
pub use generation::{GeneratedPost, GenerationRequest};
pub use ids::{ChannelId, ConversationId, MessageId, PlanId, PostId, SourceId, SourceItemId};
pub use job::{Job, JobOptions, PLAN_EXECUTION_QUEUE, PUBLISH_QUEUE, PlanExecutionJob, PublishJob};
pub use media::{GeneratedImage, MediaRef};
pub use plan::{
    ContentPlan, ContentPlanBuilder, ContentPlanBuilderError, ImageKind, ImageSettings, ImageStyle,
    Lookback, PublishMode, SelectionStrategy, SourceSelection,
};
pub use post::{NewPost, Post, PostStatus};
pub use review::{EditMode, PendingReview, ReviewEditSession};
pub use source::SourceItem;
