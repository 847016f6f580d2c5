//! The generation orchestrator.

use crate::ImageSynthesizer;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use vermeer_core::{ChannelContext, ContentPlan, GeneratedPost, GenerationRequest, SourceItem};
use vermeer_error::{GenerationError, GenerationErrorKind, VermeerResult};
use vermeer_interface::TextGenerator;

/// Assembles one post from candidate sources.
///
/// Text generation failures propagate: a post without text is useless.
/// Image failures do not: the post comes back without an image.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    text: Arc<dyn TextGenerator>,
    images: ImageSynthesizer,
}

impl std::fmt::Debug for GenerationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationOrchestrator")
            .field("images", &self.images)
            .finish_non_exhaustive()
    }
}

impl GenerationOrchestrator {
    /// Create an orchestrator.
    pub fn new(text: Arc<dyn TextGenerator>, images: ImageSynthesizer) -> Self {
        Self { text, images }
    }

    /// The image synthesizer, for regenerating images outside a plan run.
    pub fn images(&self) -> &ImageSynthesizer {
        &self.images
    }

    /// Generate one post.
    ///
    /// # Errors
    ///
    /// - `NoCandidateContent` when there are no sources and no prompt template
    /// - `Provider`, `EmptyResult` or `Timeout` when the text call fails
    #[instrument(skip_all, fields(plan_id = %plan.id, sources = sources.len()))]
    pub async fn generate_one(
        &self,
        plan: &ContentPlan,
        context: ChannelContext,
        sources: Vec<SourceItem>,
        previous_posts: Vec<String>,
    ) -> VermeerResult<GeneratedPost> {
        if sources.is_empty() && !plan.has_prompt_template() {
            return Err(GenerationError::new(GenerationErrorKind::NoCandidateContent(
                plan.id.to_string(),
            ))
            .into());
        }

        let language = context.language.clone();
        let request = GenerationRequest {
            channel: context,
            sources,
            previous_posts,
            prompt_template: plan.prompt_template.clone(),
        };

        let text = self.text.generate_text(&request).await?;
        if text.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::EmptyResult).into());
        }

        let image = if plan.image.enabled {
            let image = self.images.synthesize(&text, &plan.image, &language).await;
            if image.is_none() {
                warn!("Continuing without image");
            }
            image
        } else {
            None
        };

        info!(
            chars = text.chars().count(),
            has_image = image.is_some(),
            "Post generated"
        );

        Ok(GeneratedPost {
            text,
            source_item_ids: request.sources.iter().map(|s| s.id).collect(),
            image,
        })
    }
}
