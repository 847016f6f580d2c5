//! Configuration for a Vermeer process.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (vermeer.toml shipped with the crate)
//! 2. User config in home directory (~/.config/vermeer/vermeer.toml)
//! 3. User config in current directory (./vermeer.toml)
//! 4. An explicit file, e.g. from `--config`
//! 5. `VERMEER__<SECTION>__<KEY>` environment variables
//!
//! User files are optional and silently skipped when absent.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};
use vermeer_error::{ConfigError, VermeerError, VermeerResult};
use vermeer_pipeline::GuardSettings;
use vermeer_queue::QueueSettings;
use vermeer_review::ReviewSettings;
use vermeer_storage::FileSystemObjectStore;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../vermeer.toml");

/// Log output settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Delivery settings of one job queue.
///
/// Every key is required; the bundled file supplies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QueueConfig {
    /// Jobs running at once
    concurrency: usize,
    /// Attempts per job, including the first
    attempts: usize,
    /// Base retry delay in milliseconds
    initial_backoff_ms: u64,
    /// Upper bound on one retry delay in seconds
    max_backoff_secs: u64,
    /// Buffered jobs before enqueueing waits
    capacity: usize,
}

impl QueueConfig {
    /// Runtime settings for the queue.
    pub fn to_settings(&self) -> QueueSettings {
        QueueSettings::new(
            self.concurrency,
            self.attempts,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_secs(self.max_backoff_secs),
            self.capacity,
        )
    }
}

impl From<&QueueSettings> for QueueConfig {
    fn from(settings: &QueueSettings) -> Self {
        Self {
            concurrency: *settings.concurrency(),
            attempts: *settings.attempts(),
            initial_backoff_ms: u64::try_from(settings.initial_backoff().as_millis())
                .unwrap_or(u64::MAX),
            max_backoff_secs: settings.max_backoff().as_secs(),
            capacity: *settings.capacity(),
        }
    }
}

/// The plan-execution and publish queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct QueuesConfig {
    /// Plan execution queue
    #[serde(default = "default_generation_queue")]
    generation: QueueConfig,
    /// Publish queue
    #[serde(default = "default_publish_queue")]
    publish: QueueConfig,
}

fn default_generation_queue() -> QueueConfig {
    QueueConfig::from(&QueueSettings::generation())
}

fn default_publish_queue() -> QueueConfig {
    QueueConfig::from(&QueueSettings::publish())
}

impl Default for QueuesConfig {
    fn default() -> Self {
        Self {
            generation: default_generation_queue(),
            publish: default_publish_queue(),
        }
    }
}

/// Generation and image settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct GenerationConfig {
    /// Upper bound on items loaded by the `recent` strategy
    #[serde(default = "default_recent_fetch_cap")]
    recent_fetch_cap: usize,
    /// Raster width of vector images
    #[serde(default = "default_image_side")]
    image_width: u32,
    /// Raster height of vector images
    #[serde(default = "default_image_side")]
    image_height: u32,
    /// Bucket generated images are stored in
    #[serde(default = "default_media_bucket")]
    media_bucket: String,
    /// Deadline for each provider and transport call, in seconds
    #[serde(default = "default_provider_timeout")]
    provider_timeout_secs: u64,
}

fn default_recent_fetch_cap() -> usize {
    50
}

fn default_image_side() -> u32 {
    1080
}

fn default_media_bucket() -> String {
    "post-media".to_string()
}

fn default_provider_timeout() -> u64 {
    60
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            recent_fetch_cap: default_recent_fetch_cap(),
            image_width: default_image_side(),
            image_height: default_image_side(),
            media_bucket: default_media_bucket(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }
}

impl GenerationConfig {
    /// The provider deadline as a duration.
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs.max(1))
    }
}

/// Scheduled-post dispatcher settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct DispatcherConfig {
    /// Seconds between scans for due posts
    #[serde(default = "default_poll_interval")]
    poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl DispatcherConfig {
    /// The poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Media storage settings.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct StorageConfig {
    /// Directory generated media is written under
    #[serde(default = "default_media_dir")]
    media_dir: PathBuf,
    /// Prefix of the public path returned for stored media
    #[serde(default = "default_public_prefix")]
    public_prefix: String,
}

fn default_media_dir() -> PathBuf {
    PathBuf::from("media")
}

fn default_public_prefix() -> String {
    "/media".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: default_media_dir(),
            public_prefix: default_public_prefix(),
        }
    }
}

impl StorageConfig {
    /// Open the filesystem object store, creating the media directory.
    pub fn open_object_store(&self) -> VermeerResult<FileSystemObjectStore> {
        FileSystemObjectStore::new(&self.media_dir, self.public_prefix.clone())
    }
}

/// Complete process configuration.
///
/// # Example
///
/// ```no_run
/// use vermeer::VermeerConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = VermeerConfig::load(None)?;
/// println!("guard tolerance: {}s", config.guard().nominal_tolerance_secs());
/// # Ok(())
/// # }
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct VermeerConfig {
    /// Log output
    #[serde(default)]
    logging: LoggingConfig,
    /// Job queues
    #[serde(default)]
    queues: QueuesConfig,
    /// Duplicate-execution guard windows
    #[serde(default)]
    guard: GuardSettings,
    /// Generation and images
    #[serde(default)]
    generation: GenerationConfig,
    /// Review protocol
    #[serde(default)]
    review: ReviewSettings,
    /// Scheduled-post dispatcher
    #[serde(default)]
    dispatcher: DispatcherConfig,
    /// Media storage
    #[serde(default)]
    storage: StorageConfig,
}

impl VermeerConfig {
    /// The bundled defaults alone.
    pub fn bundled() -> VermeerResult<Self> {
        build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration from a single file, without defaults or environment.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> VermeerResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                VermeerError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration from every source in precedence order.
    ///
    /// `explicit` must exist when given; the user files may be absent.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> VermeerResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/vermeer/vermeer.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("vermeer").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("VERMEER")
                .separator("__")
                .try_parsing(true),
        );

        build(builder)
    }
}

fn build(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> VermeerResult<VermeerConfig> {
    builder
        .build()
        .map_err(|e| {
            VermeerError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?
        .try_deserialize()
        .map_err(|e| {
            VermeerError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })
}
