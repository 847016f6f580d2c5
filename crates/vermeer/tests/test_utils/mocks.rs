//! Provider and transport fakes for end-to-end runs.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Mutex;
use vermeer::{
    Channel, GeneratedImage, GenerationRequest, ImageGenerator, ImageStyle, InlineControl,
    MediaRef, MessageId, Post, PostId, Publisher, Rasterizer, ReviewNotification, ReviewNotifier,
    TextGenerator, VectorImageGenerator, VermeerResult,
};

/// Text generator that always returns the same post.
pub struct MockTextGenerator {
    text: String,
    calls: Mutex<usize>,
}

impl MockTextGenerator {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate_text(&self, _request: &GenerationRequest) -> VermeerResult<String> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.text.clone())
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
        None
    }
}

/// Image pipeline that never produces anything.
pub struct NoImages;

#[async_trait]
impl VectorImageGenerator for NoImages {
    async fn generate_vector_image(
        &self,
        _text: &str,
        _style: &ImageStyle,
        _language: &str,
    ) -> Option<String> {
        None
    }
}

#[async_trait]
impl ImageGenerator for NoImages {
    async fn generate_image(&self, _prompt: &str) -> Option<GeneratedImage> {
        None
    }
}

#[async_trait]
impl Rasterizer for NoImages {
    async fn rasterize(&self, _markup: &str, _width: u32, _height: u32) -> VermeerResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Notifier fake; records review notifications and edits.
pub struct MockNotifier {
    notifications: Mutex<Vec<ReviewNotification>>,
    edits: Mutex<Vec<(MessageId, String)>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
        }
    }

    pub fn notifications(&self) -> Vec<ReviewNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(MessageId, String)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewNotifier for MockNotifier {
    async fn send_review_notification(
        &self,
        notification: &ReviewNotification,
    ) -> VermeerResult<MessageId> {
        let mut sent = self.notifications.lock().unwrap();
        sent.push(notification.clone());
        Ok(MessageId::new(format!("review-{}", sent.len())))
    }

    async fn edit_notification(
        &self,
        message_id: &MessageId,
        text: &str,
        _controls: Option<&[InlineControl]>,
    ) -> VermeerResult<()> {
        self.edits
            .lock()
            .unwrap()
            .push((message_id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_message(
        &self,
        _recipient: &str,
        _text: &str,
        _image: Option<&MediaRef>,
        _controls: &[InlineControl],
    ) -> VermeerResult<MessageId> {
        Ok(MessageId::new("message-1"))
    }
}

/// Publisher fake that records what went out.
pub struct MockPublisher {
    published: Mutex<Vec<PostId>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self {
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
        let mut published = self.published.lock().unwrap();
        published.push(post.id);
        Ok(MessageId::new(format!("channel-{}", published.len())))
    }
}
