//! Duplicate-execution guard.
//!
//! Three independent checks against stored posts, applied in order. Any match
//! means the slot already has its post and the run is skipped.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vermeer_core::{ContentPlan, PostId};
use vermeer_error::VermeerResult;
use vermeer_interface::PostRepository;
use vermeer_scheduler::CronSchedule;

/// Windows for the three guard checks, in seconds.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct GuardSettings {
    /// Half-width of the window around the nominal slot
    #[serde(default = "default_nominal_tolerance")]
    nominal_tolerance_secs: u64,
    /// Half-width of the window around wall-clock now
    #[serde(default = "default_wall_clock_window")]
    wall_clock_window_secs: u64,
    /// How far back a plan's last creation blocks a new run
    #[serde(default = "default_recent_creation_window")]
    recent_creation_window_secs: u64,
}

fn default_nominal_tolerance() -> u64 {
    30
}

fn default_wall_clock_window() -> u64 {
    300
}

fn default_recent_creation_window() -> u64 {
    300
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            nominal_tolerance_secs: default_nominal_tolerance(),
            wall_clock_window_secs: default_wall_clock_window(),
            recent_creation_window_secs: default_recent_creation_window(),
        }
    }
}

/// Which check matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum GuardCheck {
    /// A post is scheduled within tolerance of the nominal slot
    #[display("nominal slot")]
    NominalSlot,
    /// A post is scheduled close to wall-clock now
    #[display("wall clock")]
    WallClock,
    /// A post of this plan was created moments ago
    #[display("recent creation")]
    RecentCreation,
}

/// An existing post that makes the current run a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("{} matched post {}", check, post_id)]
pub struct DuplicateMatch {
    /// Check that matched
    pub check: GuardCheck,
    /// Post that already covers the slot
    pub post_id: PostId,
}

/// Decides whether a plan execution would duplicate an existing post.
#[derive(Debug, Clone, Default)]
pub struct DuplicateGuard {
    settings: GuardSettings,
}

fn window(secs: u64) -> Duration {
    Duration::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX)).unwrap_or(Duration::MAX)
}

fn earlier(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_sub_signed(by).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn later(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl DuplicateGuard {
    /// Create a guard with the given windows.
    pub fn new(settings: GuardSettings) -> Self {
        Self { settings }
    }

    /// Guard windows.
    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    /// The slot a run belongs to.
    ///
    /// Prefers the instant the scheduler stamped into the job. Otherwise the
    /// plan's cron is evaluated for its latest occurrence at or before `now`.
    /// `None` when the cron does not parse.
    pub fn nominal_time(
        plan: &ContentPlan,
        stamped: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if stamped.is_some() {
            return stamped;
        }
        match CronSchedule::parse(&plan.cron_expression, &plan.timezone) {
            Ok(schedule) => schedule.previous(now),
            Err(e) => {
                debug!(plan_id = %plan.id, error = %e, "Cron does not parse; no nominal slot");
                None
            }
        }
    }

    /// Run the checks in order and return the first match.
    #[instrument(skip(self, posts, plan), fields(plan_id = %plan.id))]
    pub async fn check(
        &self,
        posts: &dyn PostRepository,
        plan: &ContentPlan,
        nominal: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> VermeerResult<Option<DuplicateMatch>> {
        if let Some(nominal) = nominal {
            let tolerance = window(self.settings.nominal_tolerance_secs);
            let (from, to) = (earlier(nominal, tolerance), later(nominal, tolerance));
            let found = posts.find_scheduled_between(plan.id, from, to).await?;
            if let Some(post) = found.first() {
                return Ok(Some(DuplicateMatch {
                    check: GuardCheck::NominalSlot,
                    post_id: post.id,
                }));
            }
        }

        let around = window(self.settings.wall_clock_window_secs);
        let (from, to) = (earlier(now, around), later(now, around));
        let found = posts.find_scheduled_between(plan.id, from, to).await?;
        if let Some(post) = found.first() {
            return Ok(Some(DuplicateMatch {
                check: GuardCheck::WallClock,
                post_id: post.id,
            }));
        }

        let since = earlier(now, window(self.settings.recent_creation_window_secs));
        let found = posts.find_created_since(plan.id, since).await?;
        if let Some(post) = found.first() {
            return Ok(Some(DuplicateMatch {
                check: GuardCheck::RecentCreation,
                post_id: post.id,
            }));
        }

        Ok(None)
    }
}
