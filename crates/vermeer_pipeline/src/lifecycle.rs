//! Initial state of a freshly generated post.

use chrono::{DateTime, Utc};
use vermeer_core::{PostStatus, PublishMode};

/// What must happen once the post exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CreationEffect {
    /// Enqueue a publish job for the post
    #[display("enqueue publish")]
    EnqueuePublish,
    /// Open a pending review and notify the reviewer
    #[display("request review")]
    RequestReview,
    /// Nothing
    #[display("none")]
    None,
}

/// Status, schedule and follow-up effect for a new post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitialState {
    /// Status the post is created with
    pub status: PostStatus,
    /// Scheduled time the post is created with
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Follow-up effect
    pub effect: CreationEffect,
}

/// The only place a generated post's initial status is decided.
///
/// | mode           | status           | scheduled_at | effect          |
/// |----------------|------------------|--------------|-----------------|
/// | `auto_publish` | `publishing`     | nominal      | enqueue publish |
/// | `review_first` | `pending_review` | nominal      | request review  |
/// | `draft_only`   | `draft`          | none         | none            |
pub fn initial_state(mode: PublishMode, nominal: DateTime<Utc>) -> InitialState {
    match mode {
        PublishMode::AutoPublish => InitialState {
            status: PostStatus::Publishing,
            scheduled_at: Some(nominal),
            effect: CreationEffect::EnqueuePublish,
        },
        PublishMode::ReviewFirst => InitialState {
            status: PostStatus::PendingReview,
            scheduled_at: Some(nominal),
            effect: CreationEffect::RequestReview,
        },
        PublishMode::DraftOnly => InitialState {
            status: PostStatus::Draft,
            scheduled_at: None,
            effect: CreationEffect::None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn every_mode_yields_a_consistent_schedule() {
        let nominal = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        for mode in [
            PublishMode::AutoPublish,
            PublishMode::ReviewFirst,
            PublishMode::DraftOnly,
        ] {
            let state = initial_state(mode, nominal);
            assert_eq!(
                state.status.requires_schedule(),
                state.scheduled_at.is_some(),
                "{mode}"
            );
        }
    }

    #[test]
    fn auto_publish_is_scheduled_at_the_nominal_slot() {
        let nominal = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        assert_eq!(
            initial_state(PublishMode::AutoPublish, nominal),
            InitialState {
                status: PostStatus::Publishing,
                scheduled_at: Some(nominal),
                effect: CreationEffect::EnqueuePublish,
            }
        );
    }
}
