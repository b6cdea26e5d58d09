use scrollrec::models::*;
use scrollrec::storage::*;
use scrollrec::{AppState, Config};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

const USER: &str = "0x1234567890123456789012345678901234567890";

/// Pipeline wired against in-memory stores and a fixed completion-rate
/// signal, so runs are deterministic.
fn test_state(config: Config) -> AppState {
    AppState::with_stores(
        Arc::new(config),
        Arc::new(InMemoryInteractionStore::new()),
        Arc::new(InMemoryContentCatalog::new()),
        Arc::new(InMemoryRecommendationStore::new()),
        Arc::new(InMemoryEngagementStore::new()),
        Arc::new(InMemoryRewardLedger::new()),
        Arc::new(FixedCompletionRates::uniform(0.8)),
    )
    .unwrap()
}

fn engagement_row(channel_id: u32, views: u64, calculated_at: DateTime<Utc>) -> ChannelEngagement {
    ChannelEngagement {
        channel_id,
        views,
        avg_watch_time_secs: 150.0,
        completion_rate: 0.8,
        likes: views / 2,
        shares: views / 5,
        calculated_at,
    }
}

#[tokio::test]
async fn cold_user_gets_empty_preferences() {
    let state = test_state(Config::default());

    let prefs = state
        .recommendation_service
        .extract_preferences(USER)
        .await
        .unwrap();

    assert!(prefs.preferred_topics.is_empty());
    assert!(prefs.preferred_channels.is_empty());
    assert_eq!(prefs.avg_duration_secs, 0.0);
    assert!(prefs.is_cold());
}

#[tokio::test]
async fn preference_extraction_counts_topics_and_channels() {
    let state = test_state(Config::default());
    let now = Utc::now();

    state
        .catalog
        .insert(
            ContentItem::new("content_1", 1, "Algebra")
                .with_topics(vec!["math".to_string()]),
        )
        .await
        .unwrap();
    state
        .catalog
        .insert(
            ContentItem::new("content_2", 2, "Mechanics")
                .with_topics(vec!["math".to_string(), "physics".to_string()]),
        )
        .await
        .unwrap();

    // content_1 viewed most recently, so its topics and channel are
    // encountered first during extraction.
    state
        .interactions
        .record(
            InteractionEvent::new(USER, "content_1", 1, InteractionKind::View)
                .with_duration(60)
                .at(now),
        )
        .await
        .unwrap();
    state
        .interactions
        .record(
            InteractionEvent::new(USER, "content_2", 2, InteractionKind::Like)
                .at(now - Duration::minutes(1)),
        )
        .await
        .unwrap();

    let prefs = state
        .recommendation_service
        .extract_preferences(USER)
        .await
        .unwrap();

    assert_eq!(prefs.preferred_topics, vec!["math", "physics"]);
    assert_eq!(prefs.preferred_channels, vec![1, 2]);
    assert_eq!(prefs.avg_duration_secs, 30.0);
}

#[tokio::test]
async fn removed_content_is_skipped_not_failed() {
    let state = test_state(Config::default());

    state
        .catalog
        .insert(ContentItem::new("content_1", 1, "Kept").with_topics(vec!["math".to_string()]))
        .await
        .unwrap();

    state
        .interactions
        .record(InteractionEvent::new(USER, "content_1", 1, InteractionKind::View).with_duration(100))
        .await
        .unwrap();
    // References content that was never ingested (or has been removed).
    state
        .interactions
        .record(InteractionEvent::new(USER, "content_gone", 3, InteractionKind::View).with_duration(999))
        .await
        .unwrap();

    let prefs = state
        .recommendation_service
        .extract_preferences(USER)
        .await
        .unwrap();

    assert_eq!(prefs.preferred_topics, vec!["math"]);
    assert_eq!(prefs.preferred_channels, vec![1]);
    // The dangling event is excluded from the mean entirely.
    assert_eq!(prefs.avg_duration_secs, 100.0);
}

#[tokio::test]
async fn recommendations_are_capped_and_sorted() {
    let state = test_state(Config::default());
    let now = Utc::now();

    // 25 items spread over ages and popularity; only 10 may survive.
    for i in 0..25u32 {
        state
            .catalog
            .insert(
                ContentItem::new(format!("content_{}", i), i % 10 + 1, format!("Item {}", i))
                    .with_topics(vec!["math".to_string()])
                    .with_popularity(f64::from(i % 7) / 6.0)
                    .published_at(now - Duration::days(i64::from(i) * 10)),
            )
            .await
            .unwrap();
    }
    state
        .interactions
        .record(InteractionEvent::new(USER, "content_0", 1, InteractionKind::View).with_duration(120))
        .await
        .unwrap();

    let recommendation = state
        .recommendation_service
        .generate_for_user(USER)
        .await
        .unwrap();

    assert!(recommendation.items.len() <= 10);
    for pair in recommendation.items.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    // A second run appends history rather than overwriting.
    state
        .recommendation_service
        .generate_for_user(USER)
        .await
        .unwrap();
    let latest = state
        .recommendation_store
        .latest_for_user(USER)
        .await
        .unwrap()
        .unwrap();
    assert!(latest.generated_at >= recommendation.generated_at);
}

#[tokio::test]
async fn empty_catalog_yields_empty_recommendation() {
    let state = test_state(Config::default());

    let recommendation = state
        .recommendation_service
        .generate_for_user(USER)
        .await
        .unwrap();

    assert!(recommendation.items.is_empty());

    let resolved = state
        .recommendation_service
        .latest_for_user(USER)
        .await
        .unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn latest_recommendation_resolves_titles_and_drops_removed_content() {
    let state = test_state(Config::default());

    let catalog: Arc<InMemoryContentCatalog> = Arc::new(InMemoryContentCatalog::new());
    let state = AppState::with_stores(
        state.config.clone(),
        state.interactions.clone(),
        catalog.clone(),
        state.recommendation_store.clone(),
        state.engagement_store.clone(),
        state.reward_ledger.clone(),
        Arc::new(FixedCompletionRates::uniform(0.8)),
    )
    .unwrap();

    for i in 0..3 {
        catalog
            .insert(ContentItem::new(format!("content_{}", i), 1, format!("Title {}", i)))
            .await
            .unwrap();
    }

    state.recommendation_service.generate_for_user(USER).await.unwrap();
    catalog.remove("content_1").await;

    let resolved = state
        .recommendation_service
        .latest_for_user(USER)
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);
    assert!(resolved.iter().all(|r| r.content_id != "content_1"));
    assert!(resolved.iter().any(|r| r.title == "Title 0"));
}

#[tokio::test]
async fn engagement_skips_channels_without_views() {
    let state = test_state(Config::default());
    let now = Utc::now();

    // Channel 1: one view inside the window. Channel 2: likes only.
    // Channel 3: a view, but outside the window.
    state
        .interactions
        .record(
            InteractionEvent::new(USER, "content_1", 1, InteractionKind::View)
                .with_duration(200)
                .at(now - Duration::days(1)),
        )
        .await
        .unwrap();
    state
        .interactions
        .record(InteractionEvent::new(USER, "content_2", 2, InteractionKind::Like).at(now))
        .await
        .unwrap();
    state
        .interactions
        .record(
            InteractionEvent::new(USER, "content_3", 3, InteractionKind::View)
                .with_duration(300)
                .at(now - Duration::days(30)),
        )
        .await
        .unwrap();

    let written = state.engagement_service.calculate().await.unwrap();
    assert_eq!(written, 1);

    let row = state
        .engagement_store
        .latest_for_channel(1)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.views, 1);
    assert_eq!(row.avg_watch_time_secs, 200.0);
    assert_eq!(row.completion_rate, 0.8);

    assert!(state.engagement_store.latest_for_channel(2).await.unwrap().is_none());
    assert!(state.engagement_store.latest_for_channel(3).await.unwrap().is_none());
}

#[tokio::test]
async fn engagement_recompute_is_idempotent_over_unchanged_events() {
    let state = test_state(Config::default());
    let now = Utc::now();

    for i in 0..6 {
        state
            .interactions
            .record(
                InteractionEvent::new(USER, format!("content_{}", i), 4, InteractionKind::View)
                    .with_duration(60 + i * 10)
                    .at(now - Duration::hours(i64::from(i) + 1)),
            )
            .await
            .unwrap();
    }
    state
        .interactions
        .record(InteractionEvent::new(USER, "content_0", 4, InteractionKind::Like).at(now))
        .await
        .unwrap();

    state.engagement_service.calculate().await.unwrap();
    let first = state.engagement_store.latest_for_channel(4).await.unwrap().unwrap();

    state.engagement_service.calculate().await.unwrap();
    let second = state.engagement_store.latest_for_channel(4).await.unwrap().unwrap();

    assert_eq!(first.views, second.views);
    assert_eq!(first.avg_watch_time_secs, second.avg_watch_time_secs);
    assert_eq!(first.likes, second.likes);
    assert_eq!(first.shares, second.shares);
}

#[tokio::test]
async fn rewards_pay_full_pool_to_exactly_five_channels() {
    let state = test_state(Config::default());
    let now = Utc::now();

    for channel_id in 1..=5 {
        state
            .engagement_store
            .append(engagement_row(channel_id, u64::from(channel_id) * 20, now))
            .await
            .unwrap();
    }

    let records = state.reward_service.distribute().await.unwrap();
    assert_eq!(records.len(), 5);

    let paid: f64 = records.iter().map(|r| r.reward_amount).sum();
    assert!((paid - state.config.rewards.pool_total).abs() < 1e-9);

    // Highest engagement (channel 5) takes the 30% tier.
    let top = records.iter().find(|r| r.channel_id == 5).unwrap();
    assert!((top.reward_amount - 30.0).abs() < 1e-9);
    assert_eq!(top.reward_token, "S");
}

#[tokio::test]
async fn rewards_do_not_redistribute_unused_tiers() {
    let state = test_state(Config::default());
    let now = Utc::now();

    for channel_id in 1..=3 {
        state
            .engagement_store
            .append(engagement_row(channel_id, 50, now))
            .await
            .unwrap();
    }

    let records = state.reward_service.distribute().await.unwrap();
    assert_eq!(records.len(), 3);

    // 30% + 25% + 20% of the pool; the two unused tiers stay unpaid.
    let paid: f64 = records.iter().map(|r| r.reward_amount).sum();
    assert!((paid - 75.0).abs() < 1e-9);
    assert!(paid < state.config.rewards.pool_total);

    // Identical engagement rows: ranking falls back to channel id ascending.
    let ids: Vec<u32> = records.iter().map(|r| r.channel_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn rewards_with_no_eligible_channels_is_an_empty_result() {
    let state = test_state(Config::default());

    let records = state.reward_service.distribute().await.unwrap();
    assert!(records.is_empty());
    assert!(state.reward_ledger.all().await.unwrap().is_empty());
}

/// Interaction store whose reads always fail, standing in for a lost
/// backend connection.
struct UnavailableInteractionStore;

#[async_trait::async_trait]
impl InteractionStore for UnavailableInteractionStore {
    async fn record(&self, _event: InteractionEvent) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("interaction log offline".to_string()))
    }

    async fn recent_for_user(
        &self,
        _user_id: &str,
        _limit: usize,
    ) -> Result<Vec<InteractionEvent>, StoreError> {
        Err(StoreError::Unavailable("interaction log offline".to_string()))
    }

    async fn events_in_window(
        &self,
        _channel_id: u32,
        _kind: InteractionKind,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>, StoreError> {
        Err(StoreError::Unavailable("interaction log offline".to_string()))
    }
}

#[tokio::test]
async fn infrastructure_failure_is_distinct_from_no_data() {
    // "Nothing to recommend" is an Ok with a cold/empty shape...
    let healthy = test_state(Config::default());
    let cold = healthy
        .recommendation_service
        .extract_preferences(USER)
        .await
        .unwrap();
    assert!(cold.is_cold());

    // ...while a dead store surfaces as a typed StoreError.
    let broken = AppState::with_stores(
        Arc::new(Config::default()),
        Arc::new(UnavailableInteractionStore),
        Arc::new(InMemoryContentCatalog::new()),
        Arc::new(InMemoryRecommendationStore::new()),
        Arc::new(InMemoryEngagementStore::new()),
        Arc::new(InMemoryRewardLedger::new()),
        Arc::new(FixedCompletionRates::uniform(0.8)),
    )
    .unwrap();

    let err = broken
        .recommendation_service
        .extract_preferences(USER)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Unavailable(_))
    ));

    let err = broken.engagement_service.calculate().await.unwrap_err();
    assert!(err.downcast_ref::<StoreError>().is_some());
}
