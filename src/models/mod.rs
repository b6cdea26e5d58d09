use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: String,
    pub content_id: String,
    pub channel_id: u32,
    pub kind: InteractionKind,
    /// Watch duration in seconds; 0 for anything that is not a view.
    pub duration_secs: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    View,
    Like,
    Share,
    Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub content_id: String,
    pub channel_id: u32,
    pub title: String,
    pub topics: Vec<String>,
    pub publication_date: DateTime<Utc>,
    pub popularity_score: f64,
}

/// Derived per run from a user's recent history; never stored as
/// authoritative state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    pub preferred_topics: Vec<String>,
    pub preferred_channels: Vec<u32>,
    pub avg_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<RecommendedItem>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub content_id: String,
    pub channel_id: u32,
    pub score: f64,
}

/// Latest recommendation joined against the catalog; entries whose content
/// has since been removed are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRecommendation {
    pub content_id: String,
    pub title: String,
    pub channel_id: u32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEngagement {
    pub channel_id: u32,
    pub views: u64,
    pub avg_watch_time_secs: f64,
    pub completion_rate: f64,
    pub likes: u64,
    pub shares: u64,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
    pub id: Uuid,
    pub channel_id: u32,
    pub reward_amount: f64,
    pub reward_token: String,
    pub distributed_at: DateTime<Utc>,
}

impl InteractionEvent {
    pub fn new(
        user_id: impl Into<String>,
        content_id: impl Into<String>,
        channel_id: u32,
        kind: InteractionKind,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            content_id: content_id.into(),
            channel_id,
            kind,
            duration_secs: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl ContentItem {
    pub fn new(content_id: impl Into<String>, channel_id: u32, title: impl Into<String>) -> Self {
        Self {
            content_id: content_id.into(),
            channel_id,
            title: title.into(),
            topics: Vec::new(),
            publication_date: Utc::now(),
            popularity_score: 0.0,
        }
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_popularity(mut self, score: f64) -> Self {
        self.popularity_score = score;
        self
    }

    pub fn published_at(mut self, date: DateTime<Utc>) -> Self {
        self.publication_date = date;
        self
    }
}

impl UserPreferences {
    /// Preference set for a user with no usable history.
    pub fn cold() -> Self {
        Self::default()
    }

    pub fn is_cold(&self) -> bool {
        self.preferred_topics.is_empty() && self.preferred_channels.is_empty()
    }
}

impl Recommendation {
    pub fn new(user_id: impl Into<String>, items: Vec<RecommendedItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            items,
            generated_at: Utc::now(),
        }
    }
}

impl RewardRecord {
    pub fn new(channel_id: u32, reward_amount: f64, reward_token: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel_id,
            reward_amount,
            reward_token: reward_token.into(),
            distributed_at: Utc::now(),
        }
    }
}
