//! Inline review controls and their compact callback encoding.
//!
//! Callback data is `rv:<code>:<post id>`, short enough for transports that
//! cap callback payloads at 64 bytes.

use crate::PostId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vermeer_error::{ReviewError, ReviewErrorKind};

const PREFIX: &str = "rv";

/// Every button the review flow renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
pub enum ReviewAction {
    /// Approve and publish
    Approve,
    /// Reject back to draft
    Reject,
    /// Open an edit session
    Edit,
    /// Publish later at the default delay
    Schedule,
    /// Next text message is an edit instruction
    EditText,
    /// Regenerate the image
    RegenerateImage,
    /// Publish the edited post
    PublishNow,
    /// Leave the edit session and revert
    Cancel,
}

impl ReviewAction {
    fn code(self) -> &'static str {
        match self {
            ReviewAction::Approve => "ap",
            ReviewAction::Reject => "rj",
            ReviewAction::Edit => "ed",
            ReviewAction::Schedule => "sc",
            ReviewAction::EditText => "et",
            ReviewAction::RegenerateImage => "ri",
            ReviewAction::PublishNow => "pn",
            ReviewAction::Cancel => "cx",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "ap" => ReviewAction::Approve,
            "rj" => ReviewAction::Reject,
            "ed" => ReviewAction::Edit,
            "sc" => ReviewAction::Schedule,
            "et" => ReviewAction::EditText,
            "ri" => ReviewAction::RegenerateImage,
            "pn" => ReviewAction::PublishNow,
            "cx" => ReviewAction::Cancel,
            _ => return None,
        })
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            ReviewAction::Approve => "Approve",
            ReviewAction::Reject => "Reject",
            ReviewAction::Edit => "Edit",
            ReviewAction::Schedule => "Schedule",
            ReviewAction::EditText => "Edit Text",
            ReviewAction::RegenerateImage => "Regenerate Image",
            ReviewAction::PublishNow => "Publish Now",
            ReviewAction::Cancel => "Cancel",
        }
    }
}

/// Decoded callback payload.
///
/// # Examples
///
/// ```
/// use vermeer_core::{CallbackData, PostId, ReviewAction};
///
/// let data = CallbackData::new(ReviewAction::Approve, PostId::new());
/// let parsed: CallbackData = data.to_string().parse().unwrap();
/// assert_eq!(parsed, data);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackData {
    /// Button pressed
    pub action: ReviewAction,
    /// Post the button belongs to
    pub post_id: PostId,
}

impl CallbackData {
    /// Pair an action with a post.
    pub fn new(action: ReviewAction, post_id: PostId) -> Self {
        Self { action, post_id }
    }
}

impl std::fmt::Display for CallbackData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", PREFIX, self.action.code(), self.post_id)
    }
}

impl FromStr for CallbackData {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReviewError::new(ReviewErrorKind::MalformedCallback(s.to_string()));

        let mut parts = s.splitn(3, ':');
        let (Some(PREFIX), Some(code), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let action = ReviewAction::from_code(code).ok_or_else(malformed)?;
        let post_id = id.parse::<PostId>().map_err(|_| malformed())?;
        Ok(Self { action, post_id })
    }
}

/// A button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineControl {
    /// Text shown on the button
    pub label: String,
    /// Encoded [`CallbackData`]
    pub data: String,
}

impl From<CallbackData> for InlineControl {
    fn from(data: CallbackData) -> Self {
        Self {
            label: data.action.label().to_string(),
            data: data.to_string(),
        }
    }
}

fn controls(post_id: PostId, actions: &[ReviewAction]) -> Vec<InlineControl> {
    actions
        .iter()
        .map(|action| CallbackData::new(*action, post_id).into())
        .collect()
}

/// Approve / Reject / Edit / Schedule, attached to the review notification.
pub fn review_controls(post_id: PostId) -> Vec<InlineControl> {
    controls(
        post_id,
        &[
            ReviewAction::Approve,
            ReviewAction::Reject,
            ReviewAction::Edit,
            ReviewAction::Schedule,
        ],
    )
}

/// Edit Text / Regenerate Image / Publish Now / Cancel, shown inside an edit session.
pub fn edit_controls(post_id: PostId) -> Vec<InlineControl> {
    controls(
        post_id,
        &[
            ReviewAction::EditText,
            ReviewAction::RegenerateImage,
            ReviewAction::PublishNow,
            ReviewAction::Cancel,
        ],
    )
}
