//! Process wiring: queues, workers, timers and the review service.

use crate::VermeerConfig;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use vermeer_core::{
    ContentPlan, JobOptions, PLAN_EXECUTION_QUEUE, PUBLISH_QUEUE, PlanExecutionJob, PlanId,
};
use vermeer_error::{StorageError, StorageErrorKind, VermeerResult};
use vermeer_generation::{GenerationOrchestrator, ImageSynthesizer};
use vermeer_interface::{
    ContentStore, ImageGenerator, JobQueue, ObjectStore, Publisher, Rasterizer, ReviewNotifier,
    TextGenerator, Timed, VectorImageGenerator,
};
use vermeer_pipeline::{
    ExecutorSettings, PipelineMetrics, PlanExecutor, PublishJobHandler, ScheduledPostDispatcher,
};
use vermeer_queue::{ChannelJobQueue, Worker};
use vermeer_review::ReviewService;
use vermeer_scheduler::{PlanScheduler, validate_schedule};

/// External capabilities a runtime drives.
#[derive(Clone)]
pub struct Providers {
    /// Text model
    pub text: Arc<dyn TextGenerator>,
    /// Vector markup model
    pub vector: Arc<dyn VectorImageGenerator>,
    /// Raster image model
    pub raster: Arc<dyn ImageGenerator>,
    /// Vector to raster converter
    pub rasterizer: Arc<dyn Rasterizer>,
    /// Reviewer messaging
    pub notifier: Arc<dyn ReviewNotifier>,
    /// Channel publishing
    pub publisher: Arc<dyn Publisher>,
    /// Media storage
    pub objects: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}

/// A running pipeline.
///
/// Owns one worker per queue, one timer per enabled plan and the
/// scheduled-post dispatcher. Review callbacks are routed through
/// [`review`](Self::review) by whatever transport receives them.
pub struct Runtime<S> {
    store: Arc<S>,
    queue: Arc<dyn JobQueue>,
    scheduler: PlanScheduler,
    review: ReviewService<S>,
    metrics: PipelineMetrics,
    workers: Vec<Worker>,
    dispatcher: JoinHandle<()>,
}

impl<S> std::fmt::Debug for Runtime<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

impl<S: ContentStore + 'static> Runtime<S> {
    /// Wire everything up and install timers for the stored plans.
    ///
    /// Plans with a bad schedule are logged and left without a timer.
    ///
    /// # Errors
    ///
    /// Fails only when the stored plans cannot be listed.
    #[instrument(skip_all)]
    pub async fn start(
        config: &VermeerConfig,
        store: Arc<S>,
        providers: Providers,
    ) -> VermeerResult<Self> {
        let plans = store.list_plans().await?;

        let timeout = config.generation().provider_timeout();
        let text: Arc<dyn TextGenerator> = Arc::new(Timed::new(providers.text, timeout));
        let vector: Arc<dyn VectorImageGenerator> =
            Arc::new(Timed::new(providers.vector, timeout));
        let raster: Arc<dyn ImageGenerator> = Arc::new(Timed::new(providers.raster, timeout));
        let rasterizer: Arc<dyn Rasterizer> = Arc::new(Timed::new(providers.rasterizer, timeout));
        let notifier: Arc<dyn ReviewNotifier> = Arc::new(Timed::new(providers.notifier, timeout));
        let publisher: Arc<dyn Publisher> = Arc::new(Timed::new(providers.publisher, timeout));
        let objects = providers.objects;

        let mut channels = ChannelJobQueue::new();
        let generation_rx = channels.register(
            PLAN_EXECUTION_QUEUE,
            config.queues().generation().to_settings(),
        );
        let publish_rx = channels.register(PUBLISH_QUEUE, config.queues().publish().to_settings());
        let queue: Arc<dyn JobQueue> = Arc::new(channels);

        let images = ImageSynthesizer::new(Arc::clone(&text), vector, raster, rasterizer)
            .with_size(
                *config.generation().image_width(),
                *config.generation().image_height(),
            );
        let orchestrator = GenerationOrchestrator::new(Arc::clone(&text), images.clone());

        let mut executor_settings = ExecutorSettings::default()
            .with_media_bucket(config.generation().media_bucket().clone())
            .with_recent_fetch_cap(*config.generation().recent_fetch_cap());
        if let Some(recipient) = config.review().recipient() {
            executor_settings = executor_settings.with_default_recipient(recipient.clone());
        }

        let metrics = PipelineMetrics::new();
        let executor = PlanExecutor::new(
            Arc::clone(&store),
            Arc::clone(&objects),
            Arc::clone(&queue),
            Arc::clone(&notifier),
            orchestrator,
        )
        .with_guard(config.guard().clone())
        .with_settings(executor_settings)
        .with_metrics(metrics.clone());
        let publish_handler =
            PublishJobHandler::new(Arc::clone(&store), publisher).with_metrics(metrics.clone());

        let workers = vec![
            Worker::spawn(generation_rx, Arc::new(executor)),
            Worker::spawn(publish_rx, Arc::new(publish_handler)),
        ];

        let dispatcher = ScheduledPostDispatcher::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            config.dispatcher().poll_interval(),
        )
        .spawn();

        let scheduler = PlanScheduler::new(Arc::clone(&queue));
        let summary = scheduler.bootstrap(&plans).await;
        for (plan_id, error) in &summary.rejected {
            warn!(%plan_id, error = %error, "Plan left unscheduled");
        }

        let review_settings = config
            .review()
            .clone()
            .with_media_bucket(config.generation().media_bucket().clone());
        let review = ReviewService::new(
            Arc::clone(&store),
            Arc::clone(&queue),
            notifier,
            text,
            images,
            objects,
        )
        .with_settings(review_settings);

        info!(
            plans = plans.len(),
            scheduled = summary.scheduled.len(),
            rejected = summary.rejected.len(),
            "Runtime started"
        );

        Ok(Self {
            store,
            queue,
            scheduler,
            review,
            metrics,
            workers,
            dispatcher,
        })
    }

    /// Record store the runtime works against.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Plan timers.
    pub fn scheduler(&self) -> &PlanScheduler {
        &self.scheduler
    }

    /// Review protocol entry points.
    pub fn review(&self) -> &ReviewService<S> {
        &self.review
    }

    /// Pipeline counters.
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Queue one manual execution of a plan. The duplicate guard still applies.
    #[instrument(skip(self))]
    pub async fn generate_now(&self, plan_id: PlanId) -> VermeerResult<()> {
        if self.store.get_plan(plan_id).await?.is_none() {
            return Err(
                StorageError::new(StorageErrorKind::NotFound(format!("plan {}", plan_id))).into(),
            );
        }
        self.queue
            .enqueue(PlanExecutionJob::manual(plan_id).into(), JobOptions::default())
            .await?;
        info!("Manual execution queued");
        Ok(())
    }

    /// Create or update a plan and bring its timer in line.
    ///
    /// An enabled plan with an invalid schedule is rejected before anything is
    /// stored.
    #[instrument(skip(self, plan), fields(plan_id = %plan.id, enabled = plan.enabled))]
    pub async fn save_plan(&self, plan: ContentPlan) -> VermeerResult<()> {
        if plan.enabled {
            validate_schedule(&plan.cron_expression, &plan.timezone, Utc::now())?;
        }
        let (plan_id, cron, timezone, enabled) = (
            plan.id,
            plan.cron_expression.clone(),
            plan.timezone.clone(),
            plan.enabled,
        );
        self.store.save_plan(plan).await?;
        self.scheduler.apply(plan_id, &cron, &timezone, enabled).await
    }

    /// Stop timers, the dispatcher and the workers.
    pub async fn shutdown(self) {
        self.scheduler.shutdown().await;
        self.dispatcher.abort();
        for worker in self.workers {
            worker.shutdown();
        }
        info!("Runtime stopped");
    }
}
