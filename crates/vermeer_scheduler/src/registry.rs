//! Registry of live plan timers.

use crate::CronSchedule;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use vermeer_core::{ContentPlan, JobOptions, PlanExecutionJob, PlanId};
use vermeer_error::{ScheduleError, ScheduleErrorKind, VermeerError, VermeerResult};
use vermeer_interface::JobQueue;

#[derive(Debug)]
struct PlanTimer {
    schedule: Arc<CronSchedule>,
    handle: JoinHandle<()>,
}

/// Outcome of installing timers for a batch of plans at startup.
#[derive(Debug, Default)]
pub struct BootstrapSummary {
    /// Plans that now have a timer
    pub scheduled: Vec<PlanId>,
    /// Enabled plans whose schedule was rejected
    pub rejected: Vec<(PlanId, VermeerError)>,
}

/// Keeps exactly one timer per scheduled plan.
///
/// Each timer is a spawned task that sleeps until the next cron occurrence,
/// enqueues one [`PlanExecutionJob`] stamped with that occurrence, and goes
/// back to sleep. Enqueueing never waits for the job to run.
///
/// All mutation goes through [`schedule`](Self::schedule),
/// [`reschedule`](Self::reschedule), [`unschedule`](Self::unschedule) and
/// [`apply`](Self::apply). Installing over an existing timer aborts the old
/// one, so the last write for a plan id wins.
pub struct PlanScheduler {
    queue: Arc<dyn JobQueue>,
    timers: Arc<RwLock<HashMap<PlanId, PlanTimer>>>,
}

impl std::fmt::Debug for PlanScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanScheduler").finish_non_exhaustive()
    }
}

impl PlanScheduler {
    /// Create a scheduler that enqueues onto `queue`.
    pub fn new(queue: Arc<dyn JobQueue>) -> Self {
        Self {
            queue,
            timers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Install a timer for a plan.
    ///
    /// # Errors
    ///
    /// Invalid cron expressions or timezones, and expressions that never fire
    /// again, are rejected and the registry is left as it was.
    #[instrument(skip(self))]
    pub async fn schedule(&self, plan_id: PlanId, cron: &str, timezone: &str) -> VermeerResult<()> {
        let schedule = Arc::new(CronSchedule::parse(cron, timezone)?);
        if schedule.next_after(Utc::now()).is_none() {
            return Err(
                ScheduleError::new(ScheduleErrorKind::NoUpcomingRun(cron.to_string())).into(),
            );
        }

        let handle = tokio::spawn(run_timer(
            plan_id,
            Arc::clone(&schedule),
            Arc::clone(&self.queue),
        ));

        let mut timers = self.timers.write().await;
        if let Some(old) = timers.insert(plan_id, PlanTimer { schedule, handle }) {
            old.handle.abort();
            debug!("Replaced existing timer");
        }

        info!(cron, timezone, "Plan scheduled");
        Ok(())
    }

    /// Replace a plan's timer. Same as [`schedule`](Self::schedule).
    pub async fn reschedule(
        &self,
        plan_id: PlanId,
        cron: &str,
        timezone: &str,
    ) -> VermeerResult<()> {
        self.schedule(plan_id, cron, timezone).await
    }

    /// Remove a plan's timer, returning whether one existed.
    #[instrument(skip(self))]
    pub async fn unschedule(&self, plan_id: PlanId) -> bool {
        match self.timers.write().await.remove(&plan_id) {
            Some(timer) => {
                timer.handle.abort();
                info!("Plan unscheduled");
                true
            }
            None => {
                debug!("Plan had no timer");
                false
            }
        }
    }

    /// Single entry point for plan create/update/toggle/delete events.
    ///
    /// Enabled plans are (re)scheduled, disabled ones unscheduled.
    pub async fn apply(
        &self,
        plan_id: PlanId,
        cron: &str,
        timezone: &str,
        enabled: bool,
    ) -> VermeerResult<()> {
        if enabled {
            self.schedule(plan_id, cron, timezone).await
        } else {
            self.unschedule(plan_id).await;
            Ok(())
        }
    }

    /// Install timers for every enabled plan.
    ///
    /// A plan with a bad schedule is logged and skipped; it does not stop the
    /// others from being scheduled.
    #[instrument(skip_all, fields(plans = plans.len()))]
    pub async fn bootstrap(&self, plans: &[ContentPlan]) -> BootstrapSummary {
        let mut summary = BootstrapSummary::default();
        for plan in plans.iter().filter(|p| p.enabled) {
            match self
                .schedule(plan.id, &plan.cron_expression, &plan.timezone)
                .await
            {
                Ok(()) => summary.scheduled.push(plan.id),
                Err(e) => {
                    warn!(plan_id = %plan.id, error = %e, "Skipping plan with invalid schedule");
                    summary.rejected.push((plan.id, e));
                }
            }
        }
        info!(
            scheduled = summary.scheduled.len(),
            rejected = summary.rejected.len(),
            "Scheduler bootstrapped"
        );
        summary
    }

    /// Whether a plan has a live timer.
    pub async fn is_scheduled(&self, plan_id: PlanId) -> bool {
        self.timers.read().await.contains_key(&plan_id)
    }

    /// Every plan with a live timer.
    pub async fn scheduled_plans(&self) -> Vec<PlanId> {
        self.timers.read().await.keys().copied().collect()
    }

    /// The next `count` fire times of a plan, for display.
    ///
    /// Empty when the plan is not scheduled. Timers do not consult this.
    pub async fn next_run_times(&self, plan_id: PlanId, count: usize) -> Vec<DateTime<Utc>> {
        self.next_run_times_at(plan_id, count, Utc::now()).await
    }

    /// [`next_run_times`](Self::next_run_times) relative to `now`.
    pub async fn next_run_times_at(
        &self,
        plan_id: PlanId,
        count: usize,
        now: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        self.timers
            .read()
            .await
            .get(&plan_id)
            .map(|timer| timer.schedule.upcoming(now, count))
            .unwrap_or_default()
    }

    /// Next fire time of each scheduled plan among `plan_ids`, for display.
    pub async fn next_run_times_for(&self, plan_ids: &[PlanId]) -> HashMap<PlanId, DateTime<Utc>> {
        let now = Utc::now();
        let timers = self.timers.read().await;
        plan_ids
            .iter()
            .filter_map(|id| {
                let next = timers.get(id)?.schedule.next_after(now)?;
                Some((*id, next))
            })
            .collect()
    }

    /// Abort every timer.
    pub async fn shutdown(&self) {
        let mut timers = self.timers.write().await;
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
        info!("Scheduler stopped");
    }
}

async fn run_timer(plan_id: PlanId, schedule: Arc<CronSchedule>, queue: Arc<dyn JobQueue>) {
    let mut last_fired: Option<DateTime<Utc>> = None;
    loop {
        let now = Utc::now();
        // Never fire the same occurrence twice, even if the clock lags the sleep.
        let anchor = last_fired.map_or(now, |last| last.max(now));
        let Some(next) = schedule.next_after(anchor) else {
            info!(plan_id = %plan_id, "Schedule has no further occurrences");
            return;
        };

        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;

        let job = PlanExecutionJob::scheduled(plan_id, next);
        match queue.enqueue(job.into(), JobOptions::default()).await {
            Ok(()) => debug!(plan_id = %plan_id, nominal_time = %next, "Enqueued plan execution"),
            Err(e) => error!(plan_id = %plan_id, error = %e, "Failed to enqueue plan execution"),
        }
        last_fired = Some(next);
    }
}
