use crate::models::*;
use crate::storage::{
    CompletionRateProvider, ContentCatalog, EngagementStore, InteractionStore,
    RecommendationStore, RewardLedger, StoreError,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// In-memory interaction log. Writes serialize through a coarse lock; reads
/// see a point-in-time snapshot, which is all the batch runs need.
#[derive(Default)]
pub struct InMemoryInteractionStore {
    events: RwLock<Vec<InteractionEvent>>,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn record(&self, event: InteractionEvent) -> Result<(), StoreError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InteractionEvent>, StoreError> {
        let events = self.events.read().await;
        let mut recent: Vec<InteractionEvent> = events
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn events_in_window(
        &self,
        channel_id: u32,
        kind: InteractionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| {
                e.channel_id == channel_id
                    && e.kind == kind
                    && e.timestamp >= start
                    && e.timestamp < end
            })
            .cloned()
            .collect())
    }
}

pub struct InMemoryContentCatalog {
    items: DashMap<String, ContentItem>,
    /// Insertion order, so `all()` iterates deterministically and the
    /// stable sort in the generator has a defined tie order.
    order: RwLock<Vec<String>>,
}

impl InMemoryContentCatalog {
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
            order: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub async fn remove(&self, content_id: &str) -> Option<ContentItem> {
        self.order.write().await.retain(|id| id != content_id);
        self.items.remove(content_id).map(|(_, item)| item)
    }
}

impl Default for InMemoryContentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ContentCatalog for InMemoryContentCatalog {
    async fn get(&self, content_id: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.items.get(content_id).map(|r| r.value().clone()))
    }

    async fn all(&self) -> Result<Vec<ContentItem>, StoreError> {
        let order = self.order.read().await;
        Ok(order
            .iter()
            .filter_map(|id| self.items.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn insert(&self, item: ContentItem) -> Result<(), StoreError> {
        if self.items.insert(item.content_id.clone(), item.clone()).is_none() {
            self.order.write().await.push(item.content_id);
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecommendationStore {
    rows: RwLock<Vec<Recommendation>>,
}

impl InMemoryRecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rows_for_user(&self, user_id: &str) -> usize {
        self.rows
            .read()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .count()
    }
}

#[async_trait::async_trait]
impl RecommendationStore for InMemoryRecommendationStore {
    async fn append(&self, recommendation: Recommendation) -> Result<(), StoreError> {
        info!(
            "Stored recommendation for user {} ({} items)",
            recommendation.user_id,
            recommendation.items.len()
        );
        self.rows.write().await.push(recommendation);
        Ok(())
    }

    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Recommendation>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .max_by_key(|r| r.generated_at)
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryEngagementStore {
    rows: RwLock<Vec<ChannelEngagement>>,
}

impl InMemoryEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl EngagementStore for InMemoryEngagementStore {
    async fn append(&self, engagement: ChannelEngagement) -> Result<(), StoreError> {
        self.rows.write().await.push(engagement);
        Ok(())
    }

    async fn latest_for_channel(
        &self,
        channel_id: u32,
    ) -> Result<Option<ChannelEngagement>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.channel_id == channel_id)
            .max_by_key(|r| r.calculated_at)
            .cloned())
    }

    async fn latest_per_channel(&self) -> Result<Vec<ChannelEngagement>, StoreError> {
        let rows = self.rows.read().await;
        let mut latest: HashMap<u32, ChannelEngagement> = HashMap::new();
        for row in rows.iter() {
            match latest.get(&row.channel_id) {
                Some(existing) if existing.calculated_at >= row.calculated_at => {}
                _ => {
                    latest.insert(row.channel_id, row.clone());
                }
            }
        }
        Ok(latest.into_values().collect())
    }
}

#[derive(Default)]
pub struct InMemoryRewardLedger {
    records: RwLock<Vec<RewardRecord>>,
}

impl InMemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RewardLedger for InMemoryRewardLedger {
    async fn append(&self, record: RewardRecord) -> Result<(), StoreError> {
        info!(
            "Recorded reward of {} {} for channel {}",
            record.reward_amount, record.reward_token, record.channel_id
        );
        self.records.write().await.push(record);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<RewardRecord>, StoreError> {
        Ok(self.records.read().await.clone())
    }
}

/// Fixed completion rates keyed by channel, for tests and deterministic runs.
pub struct FixedCompletionRates {
    rates: HashMap<u32, f64>,
    fallback: f64,
}

impl FixedCompletionRates {
    pub fn new(rates: HashMap<u32, f64>, fallback: f64) -> Self {
        Self { rates, fallback }
    }

    pub fn uniform(rate: f64) -> Self {
        Self {
            rates: HashMap::new(),
            fallback: rate,
        }
    }
}

#[async_trait::async_trait]
impl CompletionRateProvider for FixedCompletionRates {
    async fn completion_rate(&self, channel_id: u32) -> Result<f64, StoreError> {
        Ok(*self.rates.get(&channel_id).unwrap_or(&self.fallback))
    }
}
