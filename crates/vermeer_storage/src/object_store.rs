//! Object storage backends.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};
use vermeer_interface::ObjectStore;

/// Filesystem object store.
///
/// Objects live at `{base_path}/{bucket}/{key}` and are served from
/// `{public_prefix}/{bucket}/{key}`. Keys may contain `/` to form
/// subdirectories but may not escape the bucket.
///
/// # Example Structure
///
/// ```text
/// /var/vermeer/media/
/// └── post-images/
///     └── ab/
///         └── abcdef123456....png   (key "ab/abcdef123456....png")
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemObjectStore {
    base_path: PathBuf,
    public_prefix: String,
}

impl FileSystemObjectStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    #[tracing::instrument(skip(base_path, public_prefix))]
    pub fn new(
        base_path: impl Into<PathBuf>,
        public_prefix: impl Into<String>,
    ) -> VermeerResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::Io(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem object store");
        Ok(Self {
            base_path,
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, bucket: &str, key: &str) -> VermeerResult<PathBuf> {
        let invalid = |part: &str| {
            part.is_empty() || part.split('/').any(|seg| seg.is_empty() || seg == "..")
        };
        if invalid(bucket) || bucket.contains('/') || invalid(key) {
            return Err(StorageError::new(StorageErrorKind::Conflict(format!(
                "invalid object location {bucket}/{key}"
            )))
            .into());
        }
        Ok(self.base_path.join(bucket).join(Path::new(key)))
    }
}

#[async_trait]
impl ObjectStore for FileSystemObjectStore {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> VermeerResult<String> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::from)?;
        }

        // Write to temp file first, then rename
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes)
            .await
            .map_err(StorageError::from)?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(StorageError::from)?;

        tracing::info!(path = %path.display(), size = bytes.len(), "Stored object");
        Ok(format!("{}/{}/{}", self.public_prefix, bucket, key))
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_object(&self, bucket: &str, key: &str) -> VermeerResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(format!("{bucket}/{key}"))).into()
            } else {
                StorageError::from(e).into()
            }
        })
    }
}

/// Object store that keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObjectStore {
    objects: Arc<RwLock<HashMap<(String, String), (Vec<u8>, String)>>>,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn store_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> VermeerResult<String> {
        self.objects.write().await.insert(
            (bucket.to_string(), key.to_string()),
            (bytes.to_vec(), content_type.to_string()),
        );
        Ok(format!("/{bucket}/{key}"))
    }

    async fn fetch_object(&self, bucket: &str, key: &str) -> VermeerResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::NotFound(format!("{bucket}/{key}"))).into()
            })
    }
}
