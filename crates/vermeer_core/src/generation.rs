//! Generation inputs and outputs.

use crate::{ChannelContext, GeneratedImage, SourceItem, SourceItemId};

/// Input to the text generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Channel context
    pub channel: ChannelContext,
    /// Candidate source items
    pub sources: Vec<SourceItem>,
    /// Texts of recently published posts, newest first
    pub previous_posts: Vec<String>,
    /// Plan prompt template
    pub prompt_template: Option<String>,
}

/// A generated post, before it becomes a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPost {
    /// Post text
    pub text: String,
    /// Source items the text was generated from
    pub source_item_ids: Vec<SourceItemId>,
    /// Image, when one was requested and produced
    pub image: Option<GeneratedImage>,
}
