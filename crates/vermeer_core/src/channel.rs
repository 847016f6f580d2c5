//! Channels and the context handed to the text generator.

use crate::ChannelId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Optional author persona for "personal blog" channels.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Persona {
    /// Persona display name
    pub name: String,
    /// Who the persona is and how they write
    pub description: String,
    /// References to persona assets (avatars, reference photos)
    #[serde(default)]
    pub assets: Vec<String>,
}

/// A time-boxed narrative thread the channel is currently following.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryArc {
    /// Short title
    pub title: String,
    /// What the arc is about
    pub summary: String,
    /// Arc becomes active at this instant
    pub active_from: DateTime<Utc>,
    /// Arc stops being active at this instant, if bounded
    pub ends_at: Option<DateTime<Utc>>,
}

impl StoryArc {
    /// Whether the arc has started and not yet ended at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.active_from <= now && self.ends_at.is_none_or(|end| now < end)
    }
}

/// A publishing channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier
    pub id: ChannelId,
    /// Display title, shown to reviewers
    pub title: String,
    /// Subject area
    #[serde(default)]
    pub niche: String,
    /// Writing tone
    #[serde(default)]
    pub tone: String,
    /// Output language (e.g. "en")
    #[serde(default = "default_language")]
    pub language: String,
    /// Hashtags to weave into posts
    #[serde(default)]
    pub hashtags: Vec<String>,
    /// Persona for personal-blog channels
    #[serde(default)]
    pub persona: Option<Persona>,
    /// Story arcs, active or not
    #[serde(default)]
    pub story_arcs: Vec<StoryArc>,
    /// Where review notifications for this channel go
    #[serde(default)]
    pub reviewer: Option<String>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Channel {
    /// Create a channel with a title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: ChannelId::new(),
            title: title.into(),
            niche: String::new(),
            tone: String::new(),
            language: default_language(),
            hashtags: Vec::new(),
            persona: None,
            story_arcs: Vec::new(),
            reviewer: None,
        }
    }
}

/// Everything the text generator needs to know about the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelContext {
    /// Channel display title
    pub title: String,
    /// Subject area
    pub niche: String,
    /// Writing tone
    pub tone: String,
    /// Output language
    pub language: String,
    /// Hashtags
    pub hashtags: Vec<String>,
    /// Persona, when writing as one
    pub persona: Option<Persona>,
    /// Arcs active at generation time
    pub story_arcs: Vec<StoryArc>,
    /// Topics the plan must avoid
    pub topics_to_avoid: Vec<String>,
}

impl ChannelContext {
    /// Build the context for `channel` as of `now`, keeping only active arcs.
    pub fn from_channel(channel: &Channel, topics_to_avoid: &[String], now: DateTime<Utc>) -> Self {
        Self {
            title: channel.title.clone(),
            niche: channel.niche.clone(),
            tone: channel.tone.clone(),
            language: channel.language.clone(),
            hashtags: channel.hashtags.clone(),
            persona: channel.persona.clone(),
            story_arcs: channel
                .story_arcs
                .iter()
                .filter(|arc| arc.is_active(now))
                .cloned()
                .collect(),
            topics_to_avoid: topics_to_avoid.to_vec(),
        }
    }
}
