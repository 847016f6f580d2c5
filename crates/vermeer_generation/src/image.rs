//! Image synthesis: vector markup or descriptive prompt, behind one call.

use crate::svg;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use vermeer_core::{GeneratedImage, ImageKind, ImageSettings, MediaRef};
use vermeer_error::VermeerResult;
use vermeer_interface::{
    ImageGenerator, ObjectStore, Rasterizer, TextGenerator, VectorImageGenerator,
};

/// Produces an image for a post through either image pipeline.
///
/// Every failure along the way is soft: it is logged and the caller gets
/// `None`.
#[derive(Clone)]
pub struct ImageSynthesizer {
    text: Arc<dyn TextGenerator>,
    vector: Arc<dyn VectorImageGenerator>,
    raster: Arc<dyn ImageGenerator>,
    rasterizer: Arc<dyn Rasterizer>,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for ImageSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSynthesizer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl ImageSynthesizer {
    /// Create a synthesizer that rasterizes vector output to 1080x1080.
    pub fn new(
        text: Arc<dyn TextGenerator>,
        vector: Arc<dyn VectorImageGenerator>,
        raster: Arc<dyn ImageGenerator>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Self {
        Self {
            text,
            vector,
            raster,
            rasterizer,
            width: 1080,
            height: 1080,
        }
    }

    /// Override the raster size of the vector pipeline.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Generate an image for `text` using the plan's image settings.
    #[instrument(skip(self, text, settings), fields(kind = %settings.kind))]
    pub async fn synthesize(
        &self,
        text: &str,
        settings: &ImageSettings,
        language: &str,
    ) -> Option<GeneratedImage> {
        let image = match settings.kind {
            ImageKind::Vector => self.vector_image(text, settings, language).await,
            ImageKind::Raster => self.raster_image(text, settings, language).await,
        };
        if image.is_some() {
            debug!("Image generated");
        }
        image
    }

    async fn vector_image(
        &self,
        text: &str,
        settings: &ImageSettings,
        language: &str,
    ) -> Option<GeneratedImage> {
        let Some(markup) = self
            .vector
            .generate_vector_image(text, &settings.style, language)
            .await
        else {
            warn!("Vector generator produced no markup");
            return None;
        };

        if let Err(reason) = svg::validate(&markup) {
            warn!(%reason, "Discarding malformed vector markup");
            return None;
        }
        let markup = svg::sanitize(&markup);

        match self
            .rasterizer
            .rasterize(&markup, self.width, self.height)
            .await
        {
            Ok(png) => Some(GeneratedImage::png(png)),
            Err(e) => {
                warn!(error = %e, "Rasterization failed");
                None
            }
        }
    }

    async fn raster_image(
        &self,
        text: &str,
        settings: &ImageSettings,
        language: &str,
    ) -> Option<GeneratedImage> {
        let Some(prompt) = self.text.generate_image_prompt(text, language).await else {
            warn!("No image prompt produced");
            return None;
        };
        let prompt = styled_prompt(prompt, settings);

        let image = self.raster.generate_image(&prompt).await;
        if image.is_none() {
            warn!("Image generator produced nothing");
        }
        image
    }
}

fn styled_prompt(prompt: String, settings: &ImageSettings) -> String {
    let style = &settings.style;
    let mut parts = vec![prompt];
    if let Some(preset) = style.preset.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("Style: {preset}."));
    }
    if !style.palette.is_empty() {
        parts.push(format!("Palette: {}.", style.palette.join(", ")));
    }
    if let Some(notes) = style.notes.as_deref().filter(|n| !n.is_empty()) {
        parts.push(notes.to_string());
    }
    parts.join(" ")
}

/// Content-addressed object key: `{hash[0:2]}/{hash}.{ext}`.
pub fn media_key(image: &GeneratedImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&image.bytes);
    let hash = format!("{:x}", hasher.finalize());
    format!("{}/{}.{}", &hash[0..2], hash, image.extension())
}

/// Upload a generated image and describe where it landed.
pub async fn store_image(
    store: &dyn ObjectStore,
    bucket: &str,
    image: &GeneratedImage,
) -> VermeerResult<MediaRef> {
    let key = media_key(image);
    let path = store
        .store_object(bucket, &key, &image.bytes, &image.content_type)
        .await?;
    Ok(MediaRef {
        bucket: bucket.to_string(),
        key,
        path,
        content_type: image.content_type.clone(),
    })
}
