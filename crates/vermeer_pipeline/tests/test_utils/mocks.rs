//! Scripted capability and transport fakes.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use vermeer_core::{
    Channel, GeneratedImage, GenerationRequest, ImageStyle, InlineControl, Job, JobOptions,
    MediaRef, MessageId, Post, PostId,
};
use vermeer_error::{
    GenerationError, GenerationErrorKind, NotificationError, NotificationErrorKind, QueueError,
    QueueErrorKind, VermeerResult,
};
use vermeer_interface::{
    ImageGenerator, JobQueue, Publisher, Rasterizer, ReviewNotification, ReviewNotifier,
    TextGenerator, VectorImageGenerator,
};

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

/// Notifier fake; records everything it is asked to send.
pub struct MockNotifier {
    fail_sends: bool,
    notifications: Mutex<Vec<ReviewNotification>>,
    edits: Mutex<Vec<(MessageId, String, Option<Vec<InlineControl>>)>>,
    messages: Mutex<Vec<(String, String, Vec<InlineControl>)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            fail_sends: false,
            notifications: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::new()
        }
    }

    pub fn notifications(&self) -> Vec<ReviewNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(MessageId, String, Option<Vec<InlineControl>>)> {
        self.edits.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(String, String, Vec<InlineControl>)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewNotifier for MockNotifier {
    async fn send_review_notification(
        &self,
        notification: &ReviewNotification,
    ) -> VermeerResult<MessageId> {
        if self.fail_sends {
            return Err(NotificationError::new(NotificationErrorKind::SendFailed(
                "chat not found".into(),
            ))
            .into());
        }
        let mut sent = self.notifications.lock().unwrap();
        sent.push(notification.clone());
        Ok(MessageId::new(format!("review-{}", sent.len())))
    }

    async fn edit_notification(
        &self,
        message_id: &MessageId,
        text: &str,
        controls: Option<&[InlineControl]>,
    ) -> VermeerResult<()> {
        self.edits.lock().unwrap().push((
            message_id.clone(),
            text.to_string(),
            controls.map(<[InlineControl]>::to_vec),
        ));
        Ok(())
    }

    async fn send_message(
        &self,
        recipient: &str,
        text: &str,
        _image: Option<&MediaRef>,
        controls: &[InlineControl],
    ) -> VermeerResult<MessageId> {
        let mut sent = self.messages.lock().unwrap();
        sent.push((recipient.to_string(), text.to_string(), controls.to_vec()));
        Ok(MessageId::new(format!("message-{}", sent.len())))
    }
}

/// Publisher fake that fails its first `failures` calls.
pub struct MockPublisher {
    failures: Mutex<usize>,
    published: Mutex<Vec<PostId>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures: Mutex::new(failures),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn published(&self) -> Vec<PostId> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, _channel: &Channel, post: &Post) -> VermeerResult<MessageId> {
        {
            let mut failures = self.failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(NotificationError::new(NotificationErrorKind::SendFailed(
                    "429 Too Many Requests".into(),
                ))
                .into());
            }
        }
        let mut published = self.published.lock().unwrap();
        published.push(post.id);
        Ok(MessageId::new(format!("channel-{}", published.len())))
    }
}

/// Job queue whose consumers have shut down.
pub struct ClosedJobQueue;

#[async_trait]
impl JobQueue for ClosedJobQueue {
    async fn enqueue(&self, job: Job, _options: JobOptions) -> VermeerResult<()> {
        Err(QueueError::new(QueueErrorKind::Closed(job.queue_name().to_string())).into())
    }
}
