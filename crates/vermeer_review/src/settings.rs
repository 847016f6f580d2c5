//! Review protocol settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Settings for the review protocol.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct ReviewSettings {
    /// How far ahead the quick "Schedule" action places a post, in seconds
    #[serde(default = "default_quick_schedule_delay")]
    quick_schedule_delay_secs: u64,
    /// Reviewer for channels that name none
    #[serde(default)]
    #[setters(strip_option)]
    recipient: Option<String>,
    /// Bucket regenerated images are stored in
    #[serde(default = "default_media_bucket")]
    media_bucket: String,
}

fn default_quick_schedule_delay() -> u64 {
    3600
}

fn default_media_bucket() -> String {
    "post-media".to_string()
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            quick_schedule_delay_secs: default_quick_schedule_delay(),
            recipient: None,
            media_bucket: default_media_bucket(),
        }
    }
}

impl ReviewSettings {
    /// The quick schedule delay as a duration.
    pub fn quick_schedule_delay(&self) -> chrono::Duration {
        let secs = i64::try_from(self.quick_schedule_delay_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
    }
}
