//! Content plans: recurring generation recipes attached to a channel.

use crate::{ChannelId, PlanId, SourceId};
use serde::{Deserialize, Serialize};

/// What happens to a post once it has been generated.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PublishMode {
    /// Queue the post for publishing straight away
    AutoPublish,
    /// Hold the post for a human reviewer
    #[default]
    ReviewFirst,
    /// Leave the post as a draft
    DraftOnly,
}

/// How candidate source items are picked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SelectionStrategy {
    /// Most recently ingested unused items first
    #[default]
    Recent,
    /// Uniform random sample of all unused items
    Random,
}

/// Source selection strategy plus the number of items to hand the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    /// Selection strategy
    #[serde(default)]
    pub strategy: SelectionStrategy,
    /// How many items to select
    #[serde(default = "default_selection_count")]
    pub count: usize,
}

fn default_selection_count() -> usize {
    3
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::default(),
            count: default_selection_count(),
        }
    }
}

/// Which image pipeline a plan uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ImageKind {
    /// Vector markup generated by the text model, then rasterized
    #[default]
    Vector,
    /// Descriptive prompt fed to a raster image model
    Raster,
}

/// Visual style parameters passed to the image generators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageStyle {
    /// Named style preset (e.g. "flat", "isometric")
    #[serde(default)]
    pub preset: Option<String>,
    /// Preferred palette, as CSS colors
    #[serde(default)]
    pub palette: Vec<String>,
    /// Free-form guidance appended to the image prompt
    #[serde(default)]
    pub notes: Option<String>,
}

/// Image settings for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImageSettings {
    /// Whether posts from this plan get an image
    #[serde(default)]
    pub enabled: bool,
    /// Image pipeline to use
    #[serde(default)]
    pub kind: ImageKind,
    /// Style parameters
    #[serde(default)]
    pub style: ImageStyle,
}

/// How far back to look at prior output when asking the generator to avoid repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookback {
    /// Only consider posts published within this many days
    #[serde(default)]
    pub days: Option<u32>,
    /// Maximum number of prior posts to include
    #[serde(default = "default_lookback_posts")]
    pub post_count: usize,
}

fn default_lookback_posts() -> usize {
    10
}

impl Default for Lookback {
    fn default() -> Self {
        Self {
            days: None,
            post_count: default_lookback_posts(),
        }
    }
}

/// A recurring generation recipe attached to a channel.
///
/// # Examples
///
/// ```
/// use vermeer_core::{ChannelId, ContentPlan, PublishMode};
///
/// let plan = ContentPlan::builder()
///     .channel_id(ChannelId::new())
///     .cron_expression("0 9 * * *")
///     .publish_mode(PublishMode::AutoPublish)
///     .build()
///     .unwrap();
///
/// assert!(plan.enabled);
/// assert_eq!(plan.timezone, "UTC");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ContentPlan {
    /// Plan identifier
    #[serde(default)]
    #[builder(default)]
    pub id: PlanId,
    /// Channel the plan posts to
    pub channel_id: ChannelId,
    /// Human-readable name
    #[serde(default)]
    #[builder(default)]
    pub name: String,
    /// Whether the plan has an active timer
    #[serde(default = "default_enabled")]
    #[builder(default = "true")]
    pub enabled: bool,
    /// Five-field cron expression
    pub cron_expression: String,
    /// IANA timezone the cron expression is evaluated in
    #[serde(default = "default_timezone")]
    #[builder(default = "default_timezone()")]
    pub timezone: String,
    /// Prompt template handed to the text generator
    #[serde(default)]
    #[builder(default)]
    pub prompt_template: Option<String>,
    /// What happens to generated posts
    #[serde(default)]
    #[builder(default)]
    pub publish_mode: PublishMode,
    /// How source items are picked
    #[serde(default)]
    #[builder(default)]
    pub selection: SourceSelection,
    /// Image settings
    #[serde(default)]
    #[builder(default)]
    pub image: ImageSettings,
    /// Prior-output window
    #[serde(default)]
    #[builder(default)]
    pub lookback: Lookback,
    /// Topics the generator must not touch
    #[serde(default)]
    #[builder(default)]
    pub topics_to_avoid: Vec<String>,
    /// Linked sources
    #[serde(default)]
    #[builder(default)]
    pub source_ids: Vec<SourceId>,
}

fn default_enabled() -> bool {
    true
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl ContentPlan {
    /// Creates a new plan builder.
    pub fn builder() -> ContentPlanBuilder {
        ContentPlanBuilder::default()
    }

    /// Whether the plan has anything at all to generate from.
    pub fn has_prompt_template(&self) -> bool {
        self.prompt_template
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}
