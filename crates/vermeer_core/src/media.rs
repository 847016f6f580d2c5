//! Media attached to posts.

use serde::{Deserialize, Serialize};

/// A stored media object referenced by a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Object store bucket
    pub bucket: String,
    /// Object key within the bucket
    pub key: String,
    /// Public path returned by the object store
    pub path: String,
    /// MIME type
    pub content_type: String,
}

/// Raw image bytes produced by an image pipeline, not yet stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub content_type: String,
}

impl GeneratedImage {
    /// A PNG image.
    pub fn png(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: "image/png".to_string(),
        }
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}
