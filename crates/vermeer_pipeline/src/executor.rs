//! Plan execution jobs.

use crate::{
    CreationEffect, DuplicateGuard, DuplicateMatch, GuardSettings, PipelineMetrics, initial_state,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use vermeer_core::{
    Channel, ContentPlan, GeneratedPost, Job, JobOptions, MediaRef, NewPost, PendingReview,
    PlanExecutionJob, PlanId, Post, PostId, PostStatus, PublishJob, review_controls,
};
use vermeer_error::{GenerationErrorKind, VermeerError, VermeerErrorKind, VermeerResult};
use vermeer_generation::{GenerationOrchestrator, SourceSelector, assemble_context, store_image};
use vermeer_interface::{ContentStore, JobQueue, ObjectStore, ReviewNotification, ReviewNotifier};
use vermeer_queue::JobHandler;

/// Knobs for plan execution.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct ExecutorSettings {
    /// Bucket generated images are stored in
    #[serde(default = "default_media_bucket")]
    media_bucket: String,
    /// Reviewer used when the channel names none
    #[serde(default)]
    #[setters(strip_option)]
    default_recipient: Option<String>,
    /// Upper bound on items loaded by the `recent` strategy
    #[serde(default = "default_recent_fetch_cap")]
    recent_fetch_cap: usize,
}

fn default_media_bucket() -> String {
    "post-media".to_string()
}

fn default_recent_fetch_cap() -> usize {
    50
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            media_bucket: default_media_bucket(),
            default_recipient: None,
            recent_fetch_cap: default_recent_fetch_cap(),
        }
    }
}

/// How a plan execution ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// A post was created
    Created {
        /// The new post
        post_id: PostId,
        /// Its initial status
        status: PostStatus,
    },
    /// The slot already has a post
    Duplicate(DuplicateMatch),
    /// No unused sources and no prompt template
    NoCandidateContent,
    /// The plan no longer exists
    PlanMissing(PlanId),
    /// The plan is switched off
    PlanDisabled(PlanId),
}

/// Turns plan execution jobs into posts.
pub struct PlanExecutor<S> {
    store: Arc<S>,
    objects: Arc<dyn ObjectStore>,
    queue: Arc<dyn JobQueue>,
    notifier: Arc<dyn ReviewNotifier>,
    orchestrator: GenerationOrchestrator,
    guard: DuplicateGuard,
    selector: SourceSelector,
    settings: ExecutorSettings,
    metrics: PipelineMetrics,
}

impl<S> std::fmt::Debug for PlanExecutor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanExecutor")
            .field("guard", &self.guard)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: ContentStore + 'static> PlanExecutor<S> {
    /// Create an executor with default guard windows and settings.
    pub fn new(
        store: Arc<S>,
        objects: Arc<dyn ObjectStore>,
        queue: Arc<dyn JobQueue>,
        notifier: Arc<dyn ReviewNotifier>,
        orchestrator: GenerationOrchestrator,
    ) -> Self {
        let settings = ExecutorSettings::default();
        Self {
            store,
            objects,
            queue,
            notifier,
            orchestrator,
            guard: DuplicateGuard::default(),
            selector: SourceSelector::new(settings.recent_fetch_cap),
            settings,
            metrics: PipelineMetrics::new(),
        }
    }

    /// Use these guard windows.
    pub fn with_guard(mut self, settings: GuardSettings) -> Self {
        self.guard = DuplicateGuard::new(settings);
        self
    }

    /// Use these settings.
    pub fn with_settings(mut self, settings: ExecutorSettings) -> Self {
        self.selector = SourceSelector::new(settings.recent_fetch_cap);
        self.settings = settings;
        self
    }

    /// Count into these metrics.
    pub fn with_metrics(mut self, metrics: PipelineMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Metrics this executor counts into.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Execute one plan run as of `now`.
    ///
    /// Duplicate slots, missing or disabled plans and empty plans are
    /// successful outcomes. Text generation and storage failures are errors.
    #[instrument(skip(self), fields(plan_id = %job.plan_id))]
    pub async fn execute_at(
        &self,
        job: PlanExecutionJob,
        now: DateTime<Utc>,
    ) -> VermeerResult<ExecutionOutcome> {
        self.metrics.record_execution();

        let Some(plan) = self.store.get_plan(job.plan_id).await? else {
            info!("Plan no longer exists; nothing to do");
            return Ok(ExecutionOutcome::PlanMissing(job.plan_id));
        };
        if !plan.enabled {
            info!("Plan is disabled; nothing to do");
            return Ok(ExecutionOutcome::PlanDisabled(plan.id));
        }

        let nominal = DuplicateGuard::nominal_time(&plan, job.nominal_time, now);
        if let Some(duplicate) = self.guard.check(&*self.store, &plan, nominal, now).await? {
            info!(%duplicate, "Slot already covered; skipping");
            self.metrics.record_duplicate_skip();
            return Ok(ExecutionOutcome::Duplicate(duplicate));
        }

        let sources = self.selector.select(&*self.store, &plan).await?;
        let assembled = assemble_context(&*self.store, &*self.store, &plan, now).await?;

        let generated = match self
            .orchestrator
            .generate_one(
                &plan,
                assembled.context,
                sources,
                assembled.previous_posts,
            )
            .await
        {
            Ok(generated) => generated,
            Err(e) if is_no_candidate_content(&e) => {
                info!("No unused sources and no prompt template; skipping");
                self.metrics.record_empty_plan();
                return Ok(ExecutionOutcome::NoCandidateContent);
            }
            Err(e) => {
                self.metrics.record_generation_failure();
                return Err(e);
            }
        };

        let media = self.store_media(&plan, &generated).await;
        let image_generated = !media.is_empty();
        let state = initial_state(plan.publish_mode, nominal.unwrap_or(now));

        let post = self
            .store
            .create_post(NewPost {
                channel_id: plan.channel_id,
                plan_id: Some(plan.id),
                content: generated.text,
                status: state.status,
                scheduled_at: state.scheduled_at,
                media,
                source_item_ids: generated.source_item_ids.clone(),
                auto_generated: true,
                image_generated,
                created_at: now,
            })
            .await?;

        // Only burn sources once the post exists.
        self.store.mark_used(&generated.source_item_ids).await?;

        match state.effect {
            CreationEffect::EnqueuePublish => {
                let job = PublishJob {
                    post_id: post.id,
                    channel_id: post.channel_id,
                };
                if let Err(e) = self.queue.enqueue(Job::from(job), JobOptions::default()).await {
                    // A publishing post without a job is never picked up again.
                    error!(
                        post_id = %post.id,
                        error = %e,
                        "Publish job not queued; marking post failed"
                    );
                    self.metrics.record_publish_failure();
                    self.store
                        .update_status(post.id, PostStatus::Failed, None)
                        .await?;
                    return Err(e);
                }
            }
            CreationEffect::RequestReview => {
                self.request_review(&assembled.channel, &post, now).await?;
            }
            CreationEffect::None => {}
        }

        self.metrics.record_post_created(plan.publish_mode);
        info!(
            post_id = %post.id,
            status = %post.status,
            effect = %state.effect,
            "Post created"
        );
        Ok(ExecutionOutcome::Created {
            post_id: post.id,
            status: post.status,
        })
    }

    async fn store_media(&self, plan: &ContentPlan, generated: &GeneratedPost) -> Vec<MediaRef> {
        if !plan.image.enabled {
            return Vec::new();
        }
        let Some(image) = &generated.image else {
            self.metrics.record_image_soft_failure();
            return Vec::new();
        };
        match store_image(&*self.objects, &self.settings.media_bucket, image).await {
            Ok(media) => vec![media],
            Err(e) => {
                warn!(error = %e, "Storing image failed; continuing without it");
                self.metrics.record_image_soft_failure();
                Vec::new()
            }
        }
    }

    /// Open the pending review and page the reviewer.
    ///
    /// A failed send is logged only: the post and its pending review stay in
    /// place for recovery.
    async fn request_review(
        &self,
        channel: &Channel,
        post: &Post,
        now: DateTime<Utc>,
    ) -> VermeerResult<()> {
        let recipient = channel
            .reviewer
            .clone()
            .or_else(|| self.settings.default_recipient.clone());

        self.store
            .create_pending_review(PendingReview {
                post_id: post.id,
                channel_id: post.channel_id,
                recipient: recipient.clone().unwrap_or_default(),
                message_id: None,
                created_at: now,
            })
            .await?;

        let Some(recipient) = recipient else {
            warn!(post_id = %post.id, "No reviewer configured; review left unannounced");
            self.metrics.record_notification_failure();
            return Ok(());
        };

        let notification = ReviewNotification {
            recipient,
            post_id: post.id,
            channel_title: channel.title.clone(),
            text: post.content.clone(),
            language: channel.language.clone(),
            image: post.media.first().cloned(),
            controls: review_controls(post.id),
        };
        match self.notifier.send_review_notification(&notification).await {
            Ok(message_id) => {
                self.store
                    .set_review_message(post.id, message_id)
                    .await?;
            }
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "Review notification failed");
                self.metrics.record_notification_failure();
            }
        }
        Ok(())
    }
}

fn is_no_candidate_content(error: &VermeerError) -> bool {
    matches!(
        error.kind(),
        VermeerErrorKind::Generation(e) if matches!(e.kind, GenerationErrorKind::NoCandidateContent(_))
    )
}

#[async_trait]
impl<S: ContentStore + 'static> JobHandler for PlanExecutor<S> {
    async fn handle(&self, job: Job) -> VermeerResult<()> {
        match job {
            Job::PlanExecution(job) => self.execute_at(job, Utc::now()).await.map(|_| ()),
            Job::Publish(job) => {
                warn!(post_id = %job.post_id, "Publish job on the plan execution queue; dropped");
                Ok(())
            }
        }
    }

    async fn on_exhausted(&self, job: Job, error: &VermeerError) {
        if let Job::PlanExecution(job) = job {
            error!(plan_id = %job.plan_id, error = %error, "Plan execution failed for good");
        }
    }
}
