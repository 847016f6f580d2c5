//! Deadlines for external calls.
//!
//! A provider or transport call that never returns would hold a worker slot
//! forever. [`Timed`] wraps any capability and bounds each call.

use crate::{
    ImageGenerator, ObjectStore, Publisher, Rasterizer, ReviewNotification, ReviewNotifier,
    TextGenerator, VectorImageGenerator,
};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use vermeer_core::{
    Channel, GeneratedImage, GenerationRequest, ImageStyle, InlineControl, MediaRef, MessageId,
    Post,
};
use vermeer_error::{
    GenerationError, GenerationErrorKind, NotificationError, NotificationErrorKind, StorageError,
    StorageErrorKind, VermeerError, VermeerResult,
};

/// Wraps a capability and enforces a per-call deadline.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use vermeer_interface::{Timed, TextGenerator};
///
/// fn bounded(inner: Arc<dyn TextGenerator>) -> Arc<dyn TextGenerator> {
///     Arc::new(Timed::new(inner, Duration::from_secs(60)))
/// }
/// ```
#[derive(Debug)]
pub struct Timed<T: ?Sized> {
    inner: Arc<T>,
    timeout: Duration,
}

impl<T: ?Sized> Clone for Timed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<T: ?Sized> Timed<T> {
    /// Bound every call on `inner` by `timeout`.
    pub fn new(inner: Arc<T>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<F, R>(&self, call: F, on_timeout: impl FnOnce(u64) -> VermeerError) -> VermeerResult<R>
    where
        F: Future<Output = VermeerResult<R>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(on_timeout(self.timeout.as_secs())),
        }
    }

    async fn bounded_soft<F, R>(&self, call: F, what: &str) -> Option<R>
    where
        F: Future<Output = Option<R>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), call = what, "External call timed out");
                None
            }
        }
    }
}

fn generation_timeout(secs: u64) -> VermeerError {
    GenerationError::new(GenerationErrorKind::Timeout(secs)).into()
}

fn notification_timeout(secs: u64) -> VermeerError {
    NotificationError::new(NotificationErrorKind::Timeout(secs)).into()
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Timed<T> {
    async fn generate_text(&self, request: &GenerationRequest) -> VermeerResult<String> {
        self.bounded(self.inner.generate_text(request), generation_timeout)
            .await
    }

    async fn revise_text(
        &self,
        current: &str,
        instruction: &str,
        language: &str,
    ) -> VermeerResult<String> {
        self.bounded(
            self.inner.revise_text(current, instruction, language),
            generation_timeout,
        )
        .await
    }

    async fn generate_image_prompt(&self, text: &str, language: &str) -> Option<String> {
        self.bounded_soft(
            self.inner.generate_image_prompt(text, language),
            "generate_image_prompt",
        )
        .await
    }
}

#[async_trait]
impl<T: VectorImageGenerator + ?Sized> VectorImageGenerator for Timed<T> {
    async fn generate_vector_image(
        &self,
        text: &str,
        style: &ImageStyle,
        language: &str,
    ) -> Option<String> {
        self.bounded_soft(
            self.inner.generate_vector_image(text, style, language),
            "generate_vector_image",
        )
        .await
    }
}

#[async_trait]
impl<T: ImageGenerator + ?Sized> ImageGenerator for Timed<T> {
    async fn generate_image(&self, prompt: &str) -> Option<GeneratedImage> {
        self.bounded_soft(self.inner.generate_image(prompt), "generate_image")
            .await
    }
}

#[async_trait]
impl<T: Rasterizer + ?Sized> Rasterizer for Timed<T> {
    async fn rasterize(&self, markup: &str, width: u32, height: u32) -> VermeerResult<Vec<u8>> {
        self.bounded(
            self.inner.rasterize(markup, width, height),
            generation_timeout,
        )
        .await
    }
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for Timed<T> {
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> VermeerResult<String> {
        self.bounded(
            self.inner.store_object(bucket, key, bytes, content_type),
            |secs| {
                StorageError::new(StorageErrorKind::Backend(format!(
                    "store_object timed out after {secs}s"
                )))
                .into()
            },
        )
        .await
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> VermeerResult<Vec<u8>> {
        self.bounded(self.inner.fetch_object(bucket, key), |secs| {
            StorageError::new(StorageErrorKind::Backend(format!(
                "fetch_object timed out after {secs}s"
            )))
            .into()
        })
        .await
    }
}

#[async_trait]
impl<T: ReviewNotifier + ?Sized> ReviewNotifier for Timed<T> {
    async fn send_review_notification(
        &self,
        notification: &ReviewNotification,
    ) -> VermeerResult<MessageId> {
        self.bounded(
            self.inner.send_review_notification(notification),
            notification_timeout,
        )
        .await
    }

    async fn edit_notification(
        &self,
        message_id: &MessageId,
        text: &str,
        controls: Option<&[InlineControl]>,
    ) -> VermeerResult<()> {
        self.bounded(
            self.inner.edit_notification(message_id, text, controls),
            notification_timeout,
        )
        .await
    }

    async fn send_message(
        &self,
        recipient: &str,
        text: &str,
        image: Option<&MediaRef>,
        controls: &[InlineControl],
    ) -> VermeerResult<MessageId> {
        self.bounded(
            self.inner.send_message(recipient, text, image, controls),
            notification_timeout,
        )
        .await
    }
}

#[async_trait]
impl<T: Publisher + ?Sized> Publisher for Timed<T> {
    async fn publish(&self, channel: &Channel, post: &Post) -> VermeerResult<MessageId> {
        self.bounded(self.inner.publish(channel, post), notification_timeout)
            .await
    }
}
