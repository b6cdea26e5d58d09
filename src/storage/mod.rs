use crate::models::*;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod memory;

pub use memory::{
    FixedCompletionRates, InMemoryContentCatalog, InMemoryEngagementStore,
    InMemoryInteractionStore, InMemoryRecommendationStore, InMemoryRewardLedger,
};

/// Infrastructure failure class. Deliberately distinct from the "no data"
/// outcomes (cold user, empty catalog, no eligible channels), which are plain
/// `Ok` values throughout the pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected by storage backend: {0}")]
    WriteFailed(String),
}

/// Append-only log of user interaction events.
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn record(&self, event: InteractionEvent) -> Result<(), StoreError>;

    /// Most recent events for a user, ordered by timestamp descending.
    async fn recent_for_user(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<InteractionEvent>, StoreError>;

    /// Events of one kind for one channel within [start, end).
    async fn events_in_window(
        &self,
        channel_id: u32,
        kind: InteractionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<InteractionEvent>, StoreError>;
}

/// Read-mostly content metadata. Ingestion itself happens elsewhere; `insert`
/// exists so harnesses and tests can populate the catalog.
#[async_trait::async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn get(&self, content_id: &str) -> Result<Option<ContentItem>, StoreError>;
    async fn all(&self) -> Result<Vec<ContentItem>, StoreError>;
    async fn insert(&self, item: ContentItem) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    async fn append(&self, recommendation: Recommendation) -> Result<(), StoreError>;
    async fn latest_for_user(&self, user_id: &str) -> Result<Option<Recommendation>, StoreError>;
}

#[async_trait::async_trait]
pub trait EngagementStore: Send + Sync {
    async fn append(&self, engagement: ChannelEngagement) -> Result<(), StoreError>;
    async fn latest_for_channel(
        &self,
        channel_id: u32,
    ) -> Result<Option<ChannelEngagement>, StoreError>;

    /// Latest row per channel, for every channel that has one.
    async fn latest_per_channel(&self) -> Result<Vec<ChannelEngagement>, StoreError>;
}

#[async_trait::async_trait]
pub trait RewardLedger: Send + Sync {
    async fn append(&self, record: RewardRecord) -> Result<(), StoreError>;
    async fn all(&self) -> Result<Vec<RewardRecord>, StoreError>;
}

/// External source of per-channel completion rates. In production this is
/// playback telemetry; the crate ships a simulated provider.
#[async_trait::async_trait]
pub trait CompletionRateProvider: Send + Sync {
    async fn completion_rate(&self, channel_id: u32) -> Result<f64, StoreError>;
}
