//! Scripted capability fakes.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use vermeer_core::{GeneratedImage, GenerationRequest, ImageStyle};
use vermeer_error::{GenerationError, GenerationErrorKind, VermeerResult};
use vermeer_interface::{ImageGenerator, Rasterizer, TextGenerator, VectorImageGenerator};

/// A well-formed SVG with something to sanitize.
pub fn valid_svg() -> String {
    r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><script>alert(1)</script><rect width="10" height="10" onclick="x()"/></svg>"#.to_string()
}

/// What the text generator does.
#[derive(Debug, Clone)]
pub enum TextBehavior {
    /// Return this text
    Success(String),
    /// Fail with a provider error
    ProviderError,
    /// Return whitespace
    Empty,
}

/// Text generator fake.
pub struct MockTextGenerator {
    behavior: TextBehavior,
    image_prompt: Option<String>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextGenerator {
    pub fn new(behavior: TextBehavior) -> Self {
        Self {
            behavior,
            image_prompt: Some("A quiet harbor at dawn".to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(TextBehavior::Success(text.into()))
    }

    pub fn with_image_prompt(mut self, prompt: Option<&str>) -> Self {
        self.image_prompt = prompt.map(str::to_string);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(&self, request: &GenerationRequest) -> VermeerResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.behavior {
            TextBehavior::Success(text) => Ok(text.clone()),
            TextBehavior::ProviderError => Err(GenerationError::new(
                GenerationErrorKind::Provider("503 Service Unavailable".into()),
            )
            .into()),
            TextBehavior::Empty => Ok("   ".to_string()),
        }
    }

    async fn revise_text(
        &self,
        current: &str,
        instruction: &str,
        _language: &str,
    ) -> VermeerResult<String> {
        Ok(format!("{current} ({instruction})"))
    }

    async fn generate_image_prompt(&self, _text: &str, _language: &str) -> Option<String> {
        self.image_prompt.clone()
    }
}

/// Vector generator fake.
pub struct MockVectorGenerator {
    markup: Option<String>,
    calls: Mutex<usize>,
}

impl MockVectorGenerator {
    pub fn returning(markup: Option<String>) -> Self {
        Self {
            markup,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VectorImageGenerator for MockVectorGenerator {
    async fn generate_vector_image(
        &self,
        _text: &str,
        _style: &ImageStyle,
        _language: &str,
    ) -> Option<String> {
        *self.calls.lock().unwrap() += 1;
        self.markup.clone()
    }
}

/// Raster generator fake; records prompts.
pub struct MockImageGenerator {
    image: Option<GeneratedImage>,
    prompts: Mutex<Vec<String>>,
}

impl MockImageGenerator {
    pub fn returning(image: Option<GeneratedImage>) -> Self {
        Self {
            image,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.image.clone()
    }
}

/// Rasterizer fake; records what it was asked to render.
pub struct MockRasterizer {
    fail: bool,
    renders: Mutex<Vec<(String, u32, u32)>>,
}

impl MockRasterizer {
    pub fn working() -> Self {
        Self {
            fail: false,
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn renders(&self) -> Vec<(String, u32, u32)> {
        self.renders.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for MockRasterizer {
    async fn rasterize(&self, markup: &str, width: u32, height: u32) -> VermeerResult<Vec<u8>> {
        self.renders
            .lock()
            .unwrap()
            .push((markup.to_string(), width, height));
        if self.fail {
            return Err(GenerationError::new(GenerationErrorKind::Provider(
                "renderer crashed".into(),
            ))
            .into());
        }
        Ok(b"\x89PNG\r\n\x1a\n".to_vec())
    }
}
