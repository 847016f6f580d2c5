//! Object storage for media.

use async_trait::async_trait;
use vermeer_error::VermeerResult;

/// Bucket/key object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` and return the public path they are served from.
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> VermeerResult<String>;

    /// Fetch a stored object.
    async fn fetch_object(&self, bucket: &str, key: &str) -> VermeerResult<Vec<u8>>;
}
