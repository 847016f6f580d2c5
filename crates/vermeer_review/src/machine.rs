//! The review protocol as a pure transition function.

use crate::ReviewSettings;
use chrono::{DateTime, Utc};
use vermeer_core::{
    CallbackData, ChannelId, ConversationId, EditMode, InlineControl, MediaRef, MessageId,
    PendingReview, PlanId, Post, PostId, PostStatus, PublishJob, ReviewAction, ReviewEditSession,
    edit_controls,
};

/// Everything a transition reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewState {
    /// Pending review of the post the event concerns
    pub pending: Option<PendingReview>,
    /// The post the event concerns
    pub post: Option<Post>,
    /// Session open in the reviewer's conversation
    pub session: Option<ReviewEditSession>,
}

/// Something that happened in a reviewer conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// An inline button was pressed
    Callback {
        /// Conversation the press came from
        conversation: ConversationId,
        /// Decoded button payload
        data: CallbackData,
        /// When the press arrived
        now: DateTime<Utc>,
    },
    /// The reviewer sent free text
    TextInput {
        /// Message body
        text: String,
    },
    /// A requested text revision came back
    Revised {
        /// Revised text
        text: String,
    },
    /// A requested text revision failed
    RevisionFailed {
        /// Why
        reason: String,
    },
    /// A regenerated image was stored
    ImageReady {
        /// Where it was stored
        media: MediaRef,
    },
    /// Image regeneration produced nothing
    ImageFailed,
}

/// Work a transition asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEffect {
    /// Move the post to `status`; `None` keeps the current schedule
    SetStatus {
        /// Post to move
        post_id: PostId,
        /// New status
        status: PostStatus,
        /// New schedule
        scheduled_at: Option<DateTime<Utc>>,
    },
    /// Drop the post's pending review
    DeletePendingReview(PostId),
    /// Hand the post to the publish queue
    EnqueuePublish(PublishJob),
    /// Rewrite the original review message; `controls: None` removes buttons
    EditNotification {
        /// Message to rewrite
        message_id: MessageId,
        /// New text
        text: String,
        /// New buttons
        controls: Option<Vec<InlineControl>>,
    },
    /// Send a new message to the reviewer conversation
    SendMessage {
        /// Message text
        text: String,
        /// Image to attach
        image: Option<MediaRef>,
        /// Buttons
        controls: Vec<InlineControl>,
    },
    /// Persist new post content
    UpdateContent {
        /// Post to change
        post_id: PostId,
        /// New content
        content: String,
    },
    /// Persist new post media
    ReplaceMedia {
        /// Post to change
        post_id: PostId,
        /// New media
        media: Vec<MediaRef>,
    },
    /// Ask the text generator for a revision; answers with `Revised` or
    /// `RevisionFailed`
    ReviseText {
        /// Post being edited
        post_id: PostId,
        /// Channel, for the output language
        channel_id: ChannelId,
        /// Text to revise
        current: String,
        /// Reviewer's instruction
        instruction: String,
    },
    /// Regenerate the image; answers with `ImageReady` or `ImageFailed`
    RegenerateImage {
        /// Post being edited
        post_id: PostId,
        /// Channel, for the output language
        channel_id: ChannelId,
        /// Plan holding the image style
        plan_id: Option<PlanId>,
        /// Text the image illustrates
        text: String,
    },
    /// Short answer to the button press
    Acknowledge(String),
}

/// Next session plus the effects to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Session for the conversation afterwards; `None` closes it
    pub session: Option<ReviewEditSession>,
    /// Effects, in order
    pub effects: Vec<ReviewEffect>,
}

impl Transition {
    fn new(session: Option<ReviewEditSession>, effects: Vec<ReviewEffect>) -> Self {
        Self { session, effects }
    }

    fn ack(session: Option<ReviewEditSession>, text: &str) -> Self {
        Self::new(session, vec![ReviewEffect::Acknowledge(text.to_string())])
    }
}

const ALREADY_HANDLED: &str = "This post has already been handled.";
const SESSION_EXPIRED: &str = "This edit session has ended.";

/// Apply one event.
pub fn transition(state: ReviewState, event: ReviewEvent, settings: &ReviewSettings) -> Transition {
    match event {
        ReviewEvent::Callback {
            conversation,
            data,
            now,
        } => on_callback(state, conversation, data, now, settings),
        ReviewEvent::TextInput { text } => on_text(state, text),
        ReviewEvent::Revised { text } => on_revised(state, text),
        ReviewEvent::RevisionFailed { reason } => {
            let Some(session) = state.session else {
                return Transition::new(None, Vec::new());
            };
            let controls = edit_controls(session.post_id);
            let effects = vec![ReviewEffect::SendMessage {
                text: format!("Could not revise the text: {reason}"),
                image: None,
                controls,
            }];
            Transition::new(Some(session), effects)
        }
        ReviewEvent::ImageReady { media } => on_image_ready(state, media),
        ReviewEvent::ImageFailed => {
            let Some(session) = state.session else {
                return Transition::new(None, Vec::new());
            };
            let controls = edit_controls(session.post_id);
            let effects = vec![ReviewEffect::SendMessage {
                text: "Could not regenerate the image. The current one is kept.".to_string(),
                image: None,
                controls,
            }];
            Transition::new(Some(session), effects)
        }
    }
}

fn on_callback(
    state: ReviewState,
    conversation: ConversationId,
    data: CallbackData,
    now: DateTime<Utc>,
    settings: &ReviewSettings,
) -> Transition {
    let post_id = data.post_id;
    match data.action {
        ReviewAction::Approve | ReviewAction::Reject | ReviewAction::Schedule => {
            decide(state, data.action, post_id, now, settings)
        }
        ReviewAction::Edit => open_session(state, conversation, post_id),
        ReviewAction::EditText => {
            let Some(mut session) = session_for(&state, post_id) else {
                return Transition::ack(state.session, SESSION_EXPIRED);
            };
            session.mode = EditMode::AwaitingTextInstruction;
            Transition::new(
                Some(session),
                vec![ReviewEffect::SendMessage {
                    text: "Reply with how the text should change.".to_string(),
                    image: None,
                    controls: Vec::new(),
                }],
            )
        }
        ReviewAction::RegenerateImage => {
            let Some(mut session) = session_for(&state, post_id) else {
                return Transition::ack(state.session, SESSION_EXPIRED);
            };
            session.mode = EditMode::None;
            let effect = ReviewEffect::RegenerateImage {
                post_id,
                channel_id: session.channel_id,
                plan_id: session.plan_id,
                text: session.current_content.clone(),
            };
            Transition::new(
                Some(session),
                vec![effect, ReviewEffect::Acknowledge("Regenerating image…".to_string())],
            )
        }
        ReviewAction::PublishNow => publish_now(state, post_id),
        ReviewAction::Cancel => {
            let Some(session) = session_for(&state, post_id) else {
                return Transition::ack(state.session, SESSION_EXPIRED);
            };
            let mut effects = Vec::new();
            if session.is_modified() {
                effects.push(ReviewEffect::UpdateContent {
                    post_id,
                    content: session.original_content,
                });
            }
            effects.push(ReviewEffect::Acknowledge("Edit cancelled.".to_string()));
            Transition::new(None, effects)
        }
    }
}

/// Session in `state` if it edits `post_id`.
fn session_for(state: &ReviewState, post_id: PostId) -> Option<ReviewEditSession> {
    state
        .session
        .as_ref()
        .filter(|s| s.post_id == post_id)
        .cloned()
}

/// The conversation's session after `post_id` is decided.
fn without_post(session: Option<ReviewEditSession>, post_id: PostId) -> Option<ReviewEditSession> {
    session.filter(|s| s.post_id != post_id)
}

/// Approve, Reject or quick Schedule from the review message.
fn decide(
    state: ReviewState,
    action: ReviewAction,
    post_id: PostId,
    now: DateTime<Utc>,
    settings: &ReviewSettings,
) -> Transition {
    let (Some(pending), Some(post)) = (state.pending, state.post) else {
        return Transition::ack(state.session, ALREADY_HANDLED);
    };
    if post.status != PostStatus::PendingReview {
        return Transition::ack(without_post(state.session, post_id), ALREADY_HANDLED);
    }

    let (status, scheduled_at, outcome) = match action {
        ReviewAction::Approve => (PostStatus::Publishing, None, "Approved".to_string()),
        ReviewAction::Reject => (PostStatus::Draft, None, "Rejected".to_string()),
        _ => {
            let at = now + settings.quick_schedule_delay();
            (
                PostStatus::Scheduled,
                Some(at),
                format!("Scheduled for {}", at.format("%Y-%m-%d %H:%M UTC")),
            )
        }
    };

    let mut effects = vec![
        ReviewEffect::SetStatus {
            post_id,
            status,
            scheduled_at,
        },
        ReviewEffect::DeletePendingReview(post_id),
    ];
    if status == PostStatus::Publishing {
        effects.push(ReviewEffect::EnqueuePublish(PublishJob {
            post_id,
            channel_id: pending.channel_id,
        }));
    }
    if let Some(message_id) = pending.message_id {
        effects.push(ReviewEffect::EditNotification {
            message_id,
            text: format!("{outcome}\n\n{}", post.content),
            controls: None,
        });
    }
    effects.push(ReviewEffect::Acknowledge(format!("{outcome}.")));
    Transition::new(without_post(state.session, post_id), effects)
}

fn open_session(state: ReviewState, conversation: ConversationId, post_id: PostId) -> Transition {
    let (Some(_), Some(post)) = (&state.pending, &state.post) else {
        return Transition::ack(state.session, ALREADY_HANDLED);
    };
    if post.status != PostStatus::PendingReview {
        return Transition::ack(state.session, ALREADY_HANDLED);
    }

    let mut effects = Vec::new();
    let session = match session_for(&state, post_id) {
        Some(session) => session,
        None => {
            // One session per conversation: an abandoned edit is undone as if cancelled.
            if let Some(abandoned) = state.session.as_ref().filter(|s| s.is_modified()) {
                effects.push(ReviewEffect::UpdateContent {
                    post_id: abandoned.post_id,
                    content: abandoned.original_content.clone(),
                });
            }
            ReviewEditSession {
                conversation,
                post_id,
                channel_id: post.channel_id,
                plan_id: post.plan_id,
                original_content: post.content.clone(),
                current_content: post.content.clone(),
                image: post.media.first().cloned(),
                mode: EditMode::None,
            }
        }
    };
    effects.push(preview(&session));
    Transition::new(Some(session), effects)
}

fn publish_now(state: ReviewState, post_id: PostId) -> Transition {
    if session_for(&state, post_id).is_none() {
        return Transition::ack(state.session, SESSION_EXPIRED);
    }
    let (Some(pending), Some(post)) = (state.pending, state.post) else {
        return Transition::ack(None, ALREADY_HANDLED);
    };
    if post.status != PostStatus::PendingReview {
        return Transition::ack(None, ALREADY_HANDLED);
    }

    let mut effects = vec![
        ReviewEffect::SetStatus {
            post_id,
            status: PostStatus::Publishing,
            scheduled_at: None,
        },
        ReviewEffect::DeletePendingReview(post_id),
        ReviewEffect::EnqueuePublish(PublishJob {
            post_id,
            channel_id: pending.channel_id,
        }),
    ];
    if let Some(message_id) = pending.message_id {
        effects.push(ReviewEffect::EditNotification {
            message_id,
            text: format!("Published after editing\n\n{}", post.content),
            controls: None,
        });
    }
    effects.push(ReviewEffect::Acknowledge("Publishing.".to_string()));
    Transition::new(None, effects)
}

fn on_text(state: ReviewState, instruction: String) -> Transition {
    let Some(mut session) = state.session else {
        return Transition::new(None, Vec::new());
    };
    if session.mode != EditMode::AwaitingTextInstruction {
        return Transition::new(Some(session), Vec::new());
    }
    session.mode = EditMode::None;
    let effect = ReviewEffect::ReviseText {
        post_id: session.post_id,
        channel_id: session.channel_id,
        current: session.current_content.clone(),
        instruction,
    };
    Transition::new(Some(session), vec![effect])
}

fn on_revised(state: ReviewState, text: String) -> Transition {
    let Some(mut session) = state.session else {
        return Transition::new(None, Vec::new());
    };
    session.current_content = text.clone();
    let effects = vec![
        ReviewEffect::UpdateContent {
            post_id: session.post_id,
            content: text,
        },
        preview(&session),
    ];
    Transition::new(Some(session), effects)
}

fn on_image_ready(state: ReviewState, media: MediaRef) -> Transition {
    let Some(mut session) = state.session else {
        return Transition::new(None, Vec::new());
    };
    session.image = Some(media.clone());
    let effects = vec![
        ReviewEffect::ReplaceMedia {
            post_id: session.post_id,
            media: vec![media],
        },
        preview(&session),
    ];
    Transition::new(Some(session), effects)
}

/// The edit keyboard with the session's current preview.
fn preview(session: &ReviewEditSession) -> ReviewEffect {
    ReviewEffect::SendMessage {
        text: format!("Editing post:\n\n{}", session.current_content),
        image: session.image.clone(),
        controls: edit_controls(session.post_id),
    }
}
