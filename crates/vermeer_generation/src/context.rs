//! Channel context and prior-output assembly.

use chrono::{DateTime, Duration, Utc};
use vermeer_core::{Channel, ChannelContext, ContentPlan};
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};
use vermeer_interface::{ChannelRepository, PostRepository};

/// Everything besides source items that goes into a text generation call.
#[derive(Debug, Clone)]
pub struct AssembledContext {
    /// The plan's channel
    pub channel: Channel,
    /// Context handed to the generator
    pub context: ChannelContext,
    /// Recently published texts, newest first
    pub previous_posts: Vec<String>,
}

/// Build the channel context for `plan` and collect prior published texts
/// within the plan's lookback window.
pub async fn assemble_context(
    channels: &dyn ChannelRepository,
    posts: &dyn PostRepository,
    plan: &ContentPlan,
    now: DateTime<Utc>,
) -> VermeerResult<AssembledContext> {
    let channel = channels.get_channel(plan.channel_id).await?.ok_or_else(|| {
        StorageError::new(StorageErrorKind::NotFound(format!(
            "channel {}",
            plan.channel_id
        )))
    })?;

    let since = plan
        .lookback
        .days
        .map(|days| now - Duration::days(i64::from(days)));
    let previous_posts = if plan.lookback.post_count == 0 {
        Vec::new()
    } else {
        posts
            .recent_published(channel.id, since, plan.lookback.post_count)
            .await?
            .into_iter()
            .map(|post| post.content)
            .collect()
    };

    let context = ChannelContext::from_channel(&channel, &plan.topics_to_avoid, now);
    Ok(AssembledContext {
        channel,
        context,
        previous_posts,
    })
}
