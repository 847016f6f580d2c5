use std::sync::Arc;
use std::time::Duration;
use vermeer_core::{ChannelId, ContentPlan, PlanId};
use vermeer_error::{ScheduleErrorKind, VermeerErrorKind};
use vermeer_scheduler::PlanScheduler;
use vermeer_storage::RecordingJobQueue;

fn scheduler() -> (PlanScheduler, RecordingJobQueue) {
    let queue = RecordingJobQueue::new();
    (PlanScheduler::new(Arc::new(queue.clone())), queue)
}

#[tokio::test(start_paused = true)]
async fn test_timer_enqueues_jobs_stamped_with_nominal_time() {
    let (scheduler, queue) = scheduler();
    let plan_id = PlanId::new();

    scheduler.schedule(plan_id, "* * * * *", "UTC").await.unwrap();
    tokio::time::sleep(Duration::from_secs(185)).await;

    let jobs = queue.plan_jobs().await;
    assert!(!jobs.is_empty());
    assert!(jobs.iter().all(|j| j.plan_id == plan_id));

    let times: Vec<_> = jobs.iter().map(|j| j.nominal_time.unwrap()).collect();
    for pair in times.windows(2) {
        assert!(pair[0] < pair[1], "each slot fires once");
    }
    for time in &times {
        assert_eq!(time.timestamp() % 60, 0);
    }
}

#[tokio::test(start_paused = true)]
async fn test_rescheduling_keeps_one_timer() {
    let (scheduler, queue) = scheduler();
    let plan_id = PlanId::new();

    scheduler.schedule(plan_id, "* * * * *", "UTC").await.unwrap();
    scheduler.schedule(plan_id, "* * * * *", "UTC").await.unwrap();
    scheduler
        .reschedule(plan_id, "* * * * *", "UTC")
        .await
        .unwrap();
    assert_eq!(scheduler.scheduled_plans().await, vec![plan_id]);

    tokio::time::sleep(Duration::from_secs(65)).await;

    let times: Vec<_> = queue
        .plan_jobs()
        .await
        .into_iter()
        .map(|j| j.nominal_time)
        .collect();
    let mut deduped = times.clone();
    deduped.dedup();
    assert_eq!(times, deduped, "a stale timer fired the same slot again");
}

#[tokio::test(start_paused = true)]
async fn test_unschedule_stops_the_timer() {
    let (scheduler, queue) = scheduler();
    let plan_id = PlanId::new();

    scheduler.schedule(plan_id, "* * * * *", "UTC").await.unwrap();
    assert!(scheduler.unschedule(plan_id).await);
    assert!(!scheduler.unschedule(plan_id).await);
    assert!(!scheduler.is_scheduled(plan_id).await);

    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(queue.jobs().await.is_empty());
    assert!(scheduler.next_run_times(plan_id, 3).await.is_empty());
}

#[tokio::test]
async fn test_invalid_cron_leaves_plan_unscheduled() {
    let (scheduler, _queue) = scheduler();
    let plan_id = PlanId::new();

    assert!(scheduler.schedule(plan_id, "not a cron", "UTC").await.is_err());
    assert!(!scheduler.is_scheduled(plan_id).await);

    scheduler.schedule(plan_id, "0 9 * * *", "UTC").await.unwrap();
    assert!(scheduler.schedule(plan_id, "0 9 * *", "UTC").await.is_err());
    assert!(
        scheduler.is_scheduled(plan_id).await,
        "a rejected reschedule keeps the old timer"
    );
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_expression_that_never_fires_is_not_scheduled() {
    let (scheduler, _queue) = scheduler();
    let plan_id = PlanId::new();

    let err = scheduler
        .schedule(plan_id, "0 0 30 2 *", "UTC")
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        VermeerErrorKind::Schedule(e) if matches!(e.kind, ScheduleErrorKind::NoUpcomingRun(_))
    ));
    assert!(!scheduler.is_scheduled(plan_id).await);

    let channel = ChannelId::new();
    let never = ContentPlan::builder()
        .channel_id(channel)
        .cron_expression("0 0 30 2 *")
        .build()
        .unwrap();
    let summary = scheduler.bootstrap(&[never.clone()]).await;
    assert!(summary.scheduled.is_empty());
    assert_eq!(summary.rejected[0].0, never.id);
    assert!(scheduler.scheduled_plans().await.is_empty());
}

#[tokio::test]
async fn test_apply_follows_enabled_flag() {
    let (scheduler, _queue) = scheduler();
    let plan_id = PlanId::new();

    scheduler
        .apply(plan_id, "0 9 * * *", "UTC", true)
        .await
        .unwrap();
    assert!(scheduler.is_scheduled(plan_id).await);

    scheduler
        .apply(plan_id, "0 9 * * *", "UTC", false)
        .await
        .unwrap();
    assert!(!scheduler.is_scheduled(plan_id).await);
}

#[tokio::test]
async fn test_bootstrap_skips_disabled_and_invalid_plans() {
    let (scheduler, _queue) = scheduler();
    let channel = ChannelId::new();
    let plan = |cron: &str, enabled: bool| {
        ContentPlan::builder()
            .channel_id(channel)
            .cron_expression(cron)
            .enabled(enabled)
            .build()
            .unwrap()
    };
    let good = plan("0 9 * * *", true);
    let disabled = plan("0 10 * * *", false);
    let broken = plan("0 9 * *", true);

    let summary = scheduler
        .bootstrap(&[good.clone(), disabled.clone(), broken.clone()])
        .await;

    assert_eq!(summary.scheduled, vec![good.id]);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].0, broken.id);
    assert!(!scheduler.is_scheduled(disabled.id).await);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_next_run_times_for_display() {
    let (scheduler, _queue) = scheduler();
    let daily = PlanId::new();
    let hourly = PlanId::new();
    let unknown = PlanId::new();

    scheduler.schedule(daily, "0 9 * * *", "UTC").await.unwrap();
    scheduler.schedule(hourly, "0 * * * *", "UTC").await.unwrap();

    let runs = scheduler.next_run_times(daily, 5).await;
    assert_eq!(runs.len(), 5);
    for pair in runs.windows(2) {
        assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
    }

    let next = scheduler.next_run_times_for(&[daily, hourly, unknown]).await;
    assert_eq!(next.len(), 2);
    assert!(next[&hourly] <= next[&daily]);
    scheduler.shutdown().await;
}
