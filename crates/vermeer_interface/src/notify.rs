//! Messaging transport capabilities.

use async_trait::async_trait;
use vermeer_core::{Channel, InlineControl, MediaRef, MessageId, Post, PostId};
use vermeer_error::VermeerResult;

/// A review notification for a freshly generated post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewNotification {
    /// Who is being asked to review
    pub recipient: String,
    /// Post under review
    pub post_id: PostId,
    /// Title of the channel the post is for
    pub channel_title: String,
    /// Post text
    pub text: String,
    /// Language for transport-rendered chrome
    pub language: String,
    /// Image to attach
    pub image: Option<MediaRef>,
    /// Inline buttons
    pub controls: Vec<InlineControl>,
}

/// Sends and edits reviewer-facing messages.
#[async_trait]
pub trait ReviewNotifier: Send + Sync {
    /// Send a review notification, returning the transport message id.
    async fn send_review_notification(
        &self,
        notification: &ReviewNotification,
    ) -> VermeerResult<MessageId>;

    /// Replace the text (and optionally the buttons) of a sent message.
    ///
    /// `controls: None` removes the buttons.
    async fn edit_notification(
        &self,
        message_id: &MessageId,
        text: &str,
        controls: Option<&[InlineControl]>,
    ) -> VermeerResult<()>;

    /// Send a plain message with optional image and buttons.
    async fn send_message(
        &self,
        recipient: &str,
        text: &str,
        image: Option<&MediaRef>,
        controls: &[InlineControl],
    ) -> VermeerResult<MessageId>;
}

/// Publishes posts to their channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish `post` to `channel`, returning the transport message id.
    async fn publish(&self, channel: &Channel, post: &Post) -> VermeerResult<MessageId>;
}
