//! Text and image provider capabilities.

use async_trait::async_trait;
use vermeer_core::{GeneratedImage, GenerationRequest, ImageStyle};
use vermeer_error::VermeerResult;

/// Chat-model capability used for post text, revisions and image prompts.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate post text.
    ///
    /// Fails with a provider error on transport or rate-limit failure. An
    /// empty response is an error, never an empty post.
    async fn generate_text(&self, request: &GenerationRequest) -> VermeerResult<String>;

    /// Rewrite `current` following a reviewer's `instruction`.
    async fn revise_text(
        &self,
        current: &str,
        instruction: &str,
        language: &str,
    ) -> VermeerResult<String>;

    /// Derive a short descriptive image prompt from post text.
    ///
    /// Returns `None` when no prompt could be produced.
    async fn generate_image_prompt(&self, text: &str, language: &str) -> Option<String>;
}

/// Produces vector image markup for a post.
#[async_trait]
pub trait VectorImageGenerator: Send + Sync {
    /// Returns `None` when no image was produced.
    async fn generate_vector_image(
        &self,
        text: &str,
        style: &ImageStyle,
        language: &str,
    ) -> Option<String>;
}

/// Produces raster images from a descriptive prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns `None` when no image was produced.
    async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage>;
}

/// Renders vector markup to PNG bytes.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Rasterize `markup` to a `width` x `height` PNG.
    async fn rasterize(&self, markup: &str, width: u32, height: u32) -> VermeerResult<Vec<u8>>;
}
