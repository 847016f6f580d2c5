//! Runs review transitions against the outside world.

use crate::{ReviewEffect, ReviewEvent, ReviewSettings, ReviewState, SessionStore, transition};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{
    CallbackData, ChannelId, ConversationId, EditMode, Job, JobOptions, PlanId, PostId, PostStatus,
};
use vermeer_error::VermeerResult;
use vermeer_generation::{ImageSynthesizer, store_image};
use vermeer_interface::{ContentStore, JobQueue, ObjectStore, ReviewNotifier, TextGenerator};

/// Drives the review protocol for incoming callbacks and replies.
pub struct ReviewService<S> {
    store: Arc<S>,
    queue: Arc<dyn JobQueue>,
    notifier: Arc<dyn ReviewNotifier>,
    text: Arc<dyn TextGenerator>,
    images: ImageSynthesizer,
    objects: Arc<dyn ObjectStore>,
    sessions: SessionStore,
    settings: ReviewSettings,
}

impl<S> std::fmt::Debug for ReviewService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: ContentStore + 'static> ReviewService<S> {
    /// Create a service with default settings and an empty session store.
    pub fn new(
        store: Arc<S>,
        queue: Arc<dyn JobQueue>,
        notifier: Arc<dyn ReviewNotifier>,
        text: Arc<dyn TextGenerator>,
        images: ImageSynthesizer,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            store,
            queue,
            notifier,
            text,
            images,
            objects,
            sessions: SessionStore::new(),
            settings: ReviewSettings::default(),
        }
    }

    /// Use these settings.
    pub fn with_settings(mut self, settings: ReviewSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Open edit sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle an inline button press carrying `data`.
    ///
    /// Returns the short acknowledgement to show the reviewer.
    ///
    /// # Errors
    ///
    /// `MalformedCallback` when `data` does not decode; store and queue
    /// failures while applying the decision.
    #[instrument(skip(self, now), fields(conversation = %conversation))]
    pub async fn handle_callback(
        &self,
        conversation: &ConversationId,
        data: &str,
        now: DateTime<Utc>,
    ) -> VermeerResult<Option<String>> {
        let data: CallbackData = data.parse()?;
        debug!(action = ?data.action, post_id = %data.post_id, "Review callback");
        let event = ReviewEvent::Callback {
            conversation: conversation.clone(),
            data,
            now,
        };
        self.drive(conversation, data.post_id, event).await
    }

    /// Handle free text from the reviewer.
    ///
    /// Returns `true` when the text was taken as an edit instruction.
    #[instrument(skip(self, text), fields(conversation = %conversation))]
    pub async fn handle_text(
        &self,
        conversation: &ConversationId,
        text: &str,
    ) -> VermeerResult<bool> {
        let Some(session) = self.sessions.get(conversation).await else {
            return Ok(false);
        };
        let awaiting = session.mode == EditMode::AwaitingTextInstruction;
        let event = ReviewEvent::TextInput {
            text: text.to_string(),
        };
        self.drive(conversation, session.post_id, event).await?;
        Ok(awaiting)
    }

    /// Run events to completion: effects that call providers feed their
    /// result back in as the next event.
    async fn drive(
        &self,
        conversation: &ConversationId,
        post_id: PostId,
        event: ReviewEvent,
    ) -> VermeerResult<Option<String>> {
        let mut acknowledgement = None;
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let state = ReviewState {
                pending: self.store.get_pending_review(post_id).await?,
                post: self.store.get_post(post_id).await?,
                session: self.sessions.get(conversation).await,
            };
            let step = transition(state, event, &self.settings);
            self.sessions.replace(conversation, step.session).await;

            for effect in step.effects {
                if let ReviewEffect::Acknowledge(text) = effect {
                    acknowledgement.get_or_insert(text);
                    continue;
                }
                if let Some(follow_up) = self.apply(conversation, effect).await? {
                    next = Some(follow_up);
                }
            }
        }
        Ok(acknowledgement)
    }

    async fn apply(
        &self,
        conversation: &ConversationId,
        effect: ReviewEffect,
    ) -> VermeerResult<Option<ReviewEvent>> {
        match effect {
            ReviewEffect::SetStatus {
                post_id,
                status,
                scheduled_at,
            } => {
                self.store
                    .update_status(post_id, status, scheduled_at)
                    .await?;
                info!(%post_id, %status, "Review decision applied");
            }
            ReviewEffect::DeletePendingReview(post_id) => {
                self.store.delete_pending_review(post_id).await?;
            }
            ReviewEffect::EnqueuePublish(job) => {
                let post_id = job.post_id;
                if let Err(e) = self.queue.enqueue(Job::from(job), JobOptions::default()).await {
                    // A publishing post without a job is never picked up again.
                    error!(%post_id, error = %e, "Publish job not queued; marking post failed");
                    self.store
                        .update_status(post_id, PostStatus::Failed, None)
                        .await?;
                    return Err(e);
                }
            }
            ReviewEffect::EditNotification {
                message_id,
                text,
                controls,
            } => {
                if let Err(e) = self
                    .notifier
                    .edit_notification(&message_id, &text, controls.as_deref())
                    .await
                {
                    warn!(%message_id, error = %e, "Could not edit review message");
                }
            }
            ReviewEffect::SendMessage {
                text,
                image,
                controls,
            } => {
                if let Err(e) = self
                    .notifier
                    .send_message(conversation.as_str(), &text, image.as_ref(), &controls)
                    .await
                {
                    warn!(error = %e, "Could not send review message");
                }
            }
            ReviewEffect::UpdateContent { post_id, content } => {
                self.store.update_content(post_id, &content).await?;
            }
            ReviewEffect::ReplaceMedia { post_id, media } => {
                self.store.replace_media(post_id, media).await?;
            }
            ReviewEffect::ReviseText {
                channel_id,
                current,
                instruction,
                ..
            } => {
                let language = self.language(channel_id).await?;
                let event = match self
                    .text
                    .revise_text(&current, &instruction, &language)
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => ReviewEvent::Revised { text },
                    Ok(_) => ReviewEvent::RevisionFailed {
                        reason: "the revision came back empty".to_string(),
                    },
                    Err(e) => {
                        warn!(error = %e, "Text revision failed");
                        ReviewEvent::RevisionFailed {
                            reason: e.to_string(),
                        }
                    }
                };
                return Ok(Some(event));
            }
            ReviewEffect::RegenerateImage {
                post_id,
                channel_id,
                plan_id,
                text,
            } => {
                return self
                    .regenerate_image(post_id, channel_id, plan_id, &text)
                    .await
                    .map(Some);
            }
            ReviewEffect::Acknowledge(_) => {}
        }
        Ok(None)
    }

    async fn language(&self, channel_id: ChannelId) -> VermeerResult<String> {
        Ok(self
            .store
            .get_channel(channel_id)
            .await?
            .map(|c| c.language)
            .unwrap_or_else(|| "en".to_string()))
    }

    async fn regenerate_image(
        &self,
        post_id: PostId,
        channel_id: ChannelId,
        plan_id: Option<PlanId>,
        text: &str,
    ) -> VermeerResult<ReviewEvent> {
        let plan = match plan_id {
            Some(plan_id) => self.store.get_plan(plan_id).await?,
            None => None,
        };
        let Some(plan) = plan else {
            warn!(%post_id, "No plan to take image settings from");
            return Ok(ReviewEvent::ImageFailed);
        };
        let language = self.language(channel_id).await?;

        let Some(image) = self.images.synthesize(text, &plan.image, &language).await else {
            return Ok(ReviewEvent::ImageFailed);
        };
        match store_image(&*self.objects, self.settings.media_bucket(), &image).await {
            Ok(media) => Ok(ReviewEvent::ImageReady { media }),
            Err(e) => {
                warn!(%post_id, error = %e, "Storing regenerated image failed");
                Ok(ReviewEvent::ImageFailed)
            }
        }
    }
}
