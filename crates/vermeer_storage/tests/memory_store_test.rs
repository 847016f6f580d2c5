use chrono::{Duration, TimeZone, Utc};
use vermeer_core::{
    ChannelId, MessageId, NewPost, PendingReview, PlanId, PostStatus, SourceId, SourceItem,
};
use vermeer_error::{StorageErrorKind, VermeerErrorKind};
use vermeer_interface::{PendingReviewRepository, PostRepository, SourceRepository};
use vermeer_storage::InMemoryStore;

fn new_post(plan_id: PlanId, status: PostStatus) -> NewPost {
    let at = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
    NewPost {
        channel_id: ChannelId::new(),
        plan_id: Some(plan_id),
        content: "Hello".to_string(),
        status,
        scheduled_at: status.requires_schedule().then_some(at),
        media: vec![],
        source_item_ids: vec![],
        auto_generated: true,
        image_generated: false,
        created_at: at,
    }
}

fn is_conflict(err: &vermeer_error::VermeerError) -> bool {
    matches!(
        err.kind(),
        VermeerErrorKind::Storage(e) if matches!(e.kind(), StorageErrorKind::Conflict(_))
    )
}

#[tokio::test]
async fn test_update_status_rejects_illegal_transitions() {
    let store = InMemoryStore::new();
    let post = store
        .create_post(new_post(PlanId::new(), PostStatus::Draft))
        .await
        .unwrap();

    let err = store
        .update_status(post.id, PostStatus::Published, None)
        .await
        .unwrap_err();
    assert!(is_conflict(&err));

    // Draft has no scheduled time, so publishing needs one.
    let err = store
        .update_status(post.id, PostStatus::Publishing, None)
        .await
        .unwrap_err();
    assert!(is_conflict(&err));

    let now = Utc::now();
    let post = store
        .update_status(post.id, PostStatus::Publishing, Some(now))
        .await
        .unwrap();
    assert_eq!(post.status, PostStatus::Publishing);
    assert_eq!(post.scheduled_at, Some(now));
}

#[tokio::test]
async fn test_create_rejects_unscheduled_non_draft() {
    let store = InMemoryStore::new();
    let mut post = new_post(PlanId::new(), PostStatus::Publishing);
    post.scheduled_at = None;
    assert!(is_conflict(&store.create_post(post).await.unwrap_err()));
}

#[tokio::test]
async fn test_only_one_pending_review_per_post() {
    let store = InMemoryStore::new();
    let post = store
        .create_post(new_post(PlanId::new(), PostStatus::PendingReview))
        .await
        .unwrap();
    let review = PendingReview {
        post_id: post.id,
        channel_id: post.channel_id,
        recipient: "editor".to_string(),
        message_id: None,
        created_at: Utc::now(),
    };

    store.create_pending_review(review.clone()).await.unwrap();
    assert!(is_conflict(
        &store.create_pending_review(review).await.unwrap_err()
    ));

    store
        .set_review_message(post.id, MessageId::new("m-1"))
        .await
        .unwrap();
    let stored = store.get_pending_review(post.id).await.unwrap().unwrap();
    assert_eq!(stored.message_id, Some(MessageId::new("m-1")));

    assert!(store.delete_pending_review(post.id).await.unwrap());
    assert!(!store.delete_pending_review(post.id).await.unwrap());
}

#[tokio::test]
async fn test_scheduled_window_query_is_inclusive_and_per_plan() {
    let store = InMemoryStore::new();
    let plan = PlanId::new();
    let post = store
        .create_post(new_post(plan, PostStatus::Publishing))
        .await
        .unwrap();
    let at = post.scheduled_at.unwrap();

    let hits = store
        .find_scheduled_between(plan, at - Duration::seconds(30), at)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let misses = store
        .find_scheduled_between(PlanId::new(), at - Duration::seconds(30), at)
        .await
        .unwrap();
    assert!(misses.is_empty());
}

#[tokio::test]
async fn test_used_items_are_excluded_at_fetch() {
    let store = InMemoryStore::new();
    let source = SourceId::new();
    let base = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    let items: Vec<_> = (0..4)
        .map(|i| SourceItem::new(source, format!("item {i}"), "body", base + Duration::hours(i)))
        .collect();
    store.insert_items(items.clone()).await;

    store.mark_used(&[items[3].id]).await.unwrap();

    let recent = store.recent_unused_items(&[source], 2).await.unwrap();
    let titles: Vec<_> = recent.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["item 2", "item 1"]);

    let all = store.unused_items(&[source]).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(store.unused_items(&[SourceId::new()]).await.unwrap().is_empty());
}
