//! End-to-end runtime tests: plan timers, manual runs, review and publishing.

mod test_utils;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use test_utils::{MockNotifier, MockPublisher, MockTextGenerator, NoImages};
use vermeer::{
    Channel, ContentPlan, ConversationId, InMemoryObjectStore, InMemoryStore, PlanId,
    PlanRepository, PostStatus, Providers, PublishMode, ReviewAction, Runtime, VermeerConfig,
};

struct Harness {
    store: Arc<InMemoryStore>,
    notifier: Arc<MockNotifier>,
    publisher: Arc<MockPublisher>,
    text: Arc<MockTextGenerator>,
    channel: Channel,
}

async fn harness() -> Harness {
    let store = Arc::new(InMemoryStore::new());
    let mut channel = Channel::new("Harbor News");
    channel.reviewer = Some("chat-42".into());
    store.insert_channel(channel.clone()).await;

    Harness {
        store,
        notifier: Arc::new(MockNotifier::new()),
        publisher: Arc::new(MockPublisher::new()),
        text: Arc::new(MockTextGenerator::success("Boats are back in the harbor.")),
        channel,
    }
}

impl Harness {
    fn providers(&self) -> Providers {
        Providers {
            text: self.text.clone(),
            vector: Arc::new(NoImages),
            raster: Arc::new(NoImages),
            rasterizer: Arc::new(NoImages),
            notifier: self.notifier.clone(),
            publisher: self.publisher.clone(),
            objects: Arc::new(InMemoryObjectStore::new()),
        }
    }

    fn plan(&self, cron: &str, mode: PublishMode) -> ContentPlan {
        ContentPlan::builder()
            .channel_id(self.channel.id)
            .name("Harbor digest")
            .cron_expression(cron)
            .prompt_template(Some("Write about the harbor".to_string()))
            .publish_mode(mode)
            .build()
            .unwrap()
    }
}

async fn eventually<F, Fut>(what: &str, mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn review_first_post_is_published_after_approval() {
    let h = harness().await;
    let runtime = Runtime::start(&VermeerConfig::default(), h.store.clone(), h.providers())
        .await
        .unwrap();

    let plan = h.plan("0 9 * * *", PublishMode::ReviewFirst);
    let plan_id = plan.id;
    runtime.save_plan(plan).await.unwrap();
    assert!(runtime.scheduler().is_scheduled(plan_id).await);

    runtime.generate_now(plan_id).await.unwrap();

    let store = h.store.clone();
    eventually("pending review post", || {
        let store = store.clone();
        async move {
            store
                .posts()
                .await
                .iter()
                .any(|p| p.status == PostStatus::PendingReview)
        }
    })
    .await;

    let notifier = h.notifier.clone();
    eventually("review notification", || {
        let notifier = notifier.clone();
        async move { notifier.notifications().len() == 1 }
    })
    .await;

    let notification = h.notifier.notifications().remove(0);
    assert_eq!(notification.recipient, "chat-42");
    let approve = notification
        .controls
        .iter()
        .find(|c| c.data.parse::<vermeer::CallbackData>().unwrap().action == ReviewAction::Approve)
        .unwrap()
        .data
        .clone();

    let ack = runtime
        .review()
        .handle_callback(&ConversationId::new("chat-42"), &approve, chrono::Utc::now())
        .await
        .unwrap();
    assert!(ack.is_some());

    let metrics = runtime.metrics().clone();
    eventually("publication", || {
        let store = store.clone();
        let metrics = metrics.clone();
        async move {
            let published = store
                .posts()
                .await
                .iter()
                .all(|p| p.status == PostStatus::Published);
            published && metrics.snapshot().publishes_succeeded == 1
        }
    })
    .await;

    let post = h.store.posts().await.remove(0);
    assert_eq!(h.publisher.published(), vec![post.id]);
    assert!(post.published_at.is_some());

    let snapshot = runtime.metrics().snapshot();
    assert_eq!(snapshot.executions, 1);
    assert_eq!(snapshot.posts_created.review_first, 1);
    assert_eq!(h.text.calls(), 1);

    runtime.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn auto_publish_manual_run_goes_straight_out() {
    let h = harness().await;
    let plan = h.plan("0 9 * * *", PublishMode::AutoPublish);
    let plan_id = plan.id;
    h.store.save_plan(plan).await.unwrap();

    let runtime = Runtime::start(&VermeerConfig::default(), h.store.clone(), h.providers())
        .await
        .unwrap();
    assert!(runtime.scheduler().is_scheduled(plan_id).await);

    runtime.generate_now(plan_id).await.unwrap();

    let publisher = h.publisher.clone();
    eventually("publication", || {
        let publisher = publisher.clone();
        async move { publisher.published().len() == 1 }
    })
    .await;

    assert!(h.notifier.notifications().is_empty());
    runtime.shutdown().await;
}

#[tokio::test]
async fn startup_skips_plans_with_bad_schedules() {
    let h = harness().await;
    let good = h.plan("*/5 * * * *", PublishMode::DraftOnly);
    let bad = h.plan("every tuesday", PublishMode::DraftOnly);
    let (good_id, bad_id) = (good.id, bad.id);
    h.store.save_plan(good).await.unwrap();
    h.store.save_plan(bad).await.unwrap();

    let runtime = Runtime::start(&VermeerConfig::default(), h.store.clone(), h.providers())
        .await
        .unwrap();

    assert!(runtime.scheduler().is_scheduled(good_id).await);
    assert!(!runtime.scheduler().is_scheduled(bad_id).await);
    runtime.shutdown().await;
}

#[tokio::test]
async fn save_plan_keeps_timers_in_line() {
    let h = harness().await;
    let runtime = Runtime::start(&VermeerConfig::default(), h.store.clone(), h.providers())
        .await
        .unwrap();

    let bad = h.plan("99 * * * *", PublishMode::DraftOnly);
    let bad_id = bad.id;
    assert!(runtime.save_plan(bad).await.is_err());
    assert!(h.store.get_plan(bad_id).await.unwrap().is_none());

    let mut plan = h.plan("0 * * * *", PublishMode::DraftOnly);
    plan.enabled = false;
    let plan_id = plan.id;
    runtime.save_plan(plan.clone()).await.unwrap();
    assert!(!runtime.scheduler().is_scheduled(plan_id).await);

    plan.enabled = true;
    runtime.save_plan(plan.clone()).await.unwrap();
    assert!(runtime.scheduler().is_scheduled(plan_id).await);

    plan.enabled = false;
    runtime.save_plan(plan).await.unwrap();
    assert!(!runtime.scheduler().is_scheduled(plan_id).await);

    runtime.shutdown().await;
}

#[tokio::test]
async fn generate_now_requires_a_stored_plan() {
    let h = harness().await;
    let runtime = Runtime::start(&VermeerConfig::default(), h.store.clone(), h.providers())
        .await
        .unwrap();

    let err = runtime.generate_now(PlanId::new()).await.unwrap_err();
    assert!(!err.is_retryable());
    runtime.shutdown().await;
}
