use crate::config::Config;
use crate::models::*;
use crate::scoring::relevance_score;
use crate::storage::{ContentCatalog, InteractionStore, RecommendationStore};
use crate::utils::{mean, FrequencyCounter};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub struct RecommendationService {
    interactions: Arc<dyn InteractionStore>,
    catalog: Arc<dyn ContentCatalog>,
    recommendations: Arc<dyn RecommendationStore>,
    config: Arc<Config>,
}

impl RecommendationService {
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        catalog: Arc<dyn ContentCatalog>,
        recommendations: Arc<dyn RecommendationStore>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            interactions,
            catalog,
            recommendations,
            config,
        }
    }

    /// Derive a user's preferences from their recent interaction history.
    ///
    /// Events whose content is no longer in the catalog are excluded data
    /// points, not errors. A user with no usable history gets the cold
    /// preference set.
    pub async fn extract_preferences(&self, user_id: &str) -> Result<UserPreferences> {
        let events = self
            .interactions
            .recent_for_user(user_id, self.config.recommendation.history_limit)
            .await?;

        if events.is_empty() {
            return Ok(UserPreferences::cold());
        }

        let mut topic_counts = FrequencyCounter::new();
        let mut channel_counts = FrequencyCounter::new();
        let mut matched_durations = Vec::new();

        for event in &events {
            // Content may have been removed since the event was recorded.
            let Some(content) = self.catalog.get(&event.content_id).await? else {
                continue;
            };

            // A two-topic item bumps two topic counters.
            for topic in &content.topics {
                topic_counts.bump(topic.clone());
            }
            channel_counts.bump(content.channel_id);
            matched_durations.push(event.duration_secs as f64);
        }

        let depth = self.config.recommendation.preference_depth;
        Ok(UserPreferences {
            preferred_topics: topic_counts.top(depth),
            preferred_channels: channel_counts.top(depth),
            avg_duration_secs: mean(matched_durations),
        })
    }

    /// Score the whole catalog for one user and persist a new top-N row.
    /// Prior rows are kept; "latest" wins by `generated_at`.
    pub async fn generate_for_user(&self, user_id: &str) -> Result<Recommendation> {
        let prefs = self.extract_preferences(user_id).await?;
        let catalog = self.catalog.all().await?;
        let now = Utc::now();

        let mut items: Vec<RecommendedItem> = catalog
            .iter()
            .map(|content| RecommendedItem {
                content_id: content.content_id.clone(),
                channel_id: content.channel_id,
                score: relevance_score(content, &prefs, now),
            })
            .collect();

        // Stable sort: equal scores keep catalog iteration order.
        items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        items.truncate(self.config.recommendation.top_n);

        let recommendation = Recommendation::new(user_id, items);
        self.recommendations.append(recommendation.clone()).await?;

        info!(
            "Generated {} recommendations for user {} (cold: {})",
            recommendation.items.len(),
            user_id,
            prefs.is_cold()
        );
        Ok(recommendation)
    }

    /// One full recompute for each user in the set.
    pub async fn generate_for_users(&self, user_ids: &[String]) -> Result<usize> {
        let mut generated = 0;
        for user_id in user_ids {
            self.generate_for_user(user_id).await?;
            generated += 1;
        }
        info!("Recommendation run complete for {} users", generated);
        Ok(generated)
    }

    /// Latest stored recommendation for a user, joined against the catalog.
    /// Entries whose content has since been removed are dropped.
    pub async fn latest_for_user(&self, user_id: &str) -> Result<Vec<ResolvedRecommendation>> {
        let Some(recommendation) = self.recommendations.latest_for_user(user_id).await? else {
            return Ok(Vec::new());
        };

        let mut resolved = Vec::with_capacity(recommendation.items.len());
        for item in &recommendation.items {
            if let Some(content) = self.catalog.get(&item.content_id).await? {
                resolved.push(ResolvedRecommendation {
                    content_id: item.content_id.clone(),
                    title: content.title,
                    channel_id: item.channel_id,
                    score: item.score,
                });
            }
        }
        Ok(resolved)
    }
}
