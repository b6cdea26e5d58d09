use crate::models::{ChannelEngagement, ContentItem, UserPreferences};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

// Relevance weights. Fixed for compatibility with stored scores; they sum to
// 1.0 so a full match of a fresh, maximally popular item scores exactly 1.0.
pub const TOPIC_WEIGHT: f64 = 0.4;
pub const CHANNEL_WEIGHT: f64 = 0.3;
pub const RECENCY_WEIGHT: f64 = 0.2;
pub const POPULARITY_WEIGHT: f64 = 0.1;

/// Recency decays linearly to zero over this many days.
pub const RECENCY_HORIZON_DAYS: f64 = 100.0;

// Engagement weights and the normalization knees of each raw metric.
pub const VIEWS_WEIGHT: f64 = 0.3;
pub const WATCH_TIME_WEIGHT: f64 = 0.25;
pub const COMPLETION_WEIGHT: f64 = 0.2;
pub const LIKES_WEIGHT: f64 = 0.15;
pub const SHARES_WEIGHT: f64 = 0.1;

pub const VIEWS_SATURATION: f64 = 100.0;
pub const WATCH_TIME_SATURATION_SECS: f64 = 300.0;
pub const LIKES_SATURATION: f64 = 50.0;
pub const SHARES_SATURATION: f64 = 20.0;

/// Share of the reward pool paid to each rank, best first. Unused tiers are
/// not redistributed when fewer channels qualify.
pub const REWARD_TIERS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

/// Relevance of one content item to one user, scored independently of the
/// rest of the catalog.
pub fn relevance_score(content: &ContentItem, prefs: &UserPreferences, now: DateTime<Utc>) -> f64 {
    let matched_topics = content
        .topics
        .iter()
        .filter(|topic| prefs.preferred_topics.contains(topic))
        .count();
    let topic_match = matched_topics as f64 / prefs.preferred_topics.len().max(1) as f64;

    let channel_match = if prefs.preferred_channels.contains(&content.channel_id) {
        1.0
    } else {
        0.0
    };

    let days_old = (now - content.publication_date).num_days() as f64;
    let recency = (1.0 - days_old / RECENCY_HORIZON_DAYS).max(0.0);

    TOPIC_WEIGHT * topic_match
        + CHANNEL_WEIGHT * channel_match
        + RECENCY_WEIGHT * recency
        + POPULARITY_WEIGHT * content.popularity_score
}

/// Aggregate audience engagement of a channel as a scalar in [0, 1]. Raw
/// counts saturate at their normalization knees so one viral channel cannot
/// swamp the ranking.
pub fn engagement_score(engagement: &ChannelEngagement) -> f64 {
    let views = (engagement.views as f64 / VIEWS_SATURATION).min(1.0);
    let watch_time = (engagement.avg_watch_time_secs / WATCH_TIME_SATURATION_SECS).min(1.0);
    let likes = (engagement.likes as f64 / LIKES_SATURATION).min(1.0);
    let shares = (engagement.shares as f64 / SHARES_SATURATION).min(1.0);

    VIEWS_WEIGHT * views
        + WATCH_TIME_WEIGHT * watch_time
        + COMPLETION_WEIGHT * engagement.completion_rate
        + LIKES_WEIGHT * likes
        + SHARES_WEIGHT * shares
}

/// Reward ranking comparator: score descending, channel id ascending on
/// ties. Deterministic so repeated runs pay the same channels.
pub fn reward_rank_order(a: &(u32, f64), b: &(u32, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn prefs() -> UserPreferences {
        UserPreferences {
            preferred_topics: vec!["math".to_string(), "physics".to_string()],
            preferred_channels: vec![1, 2],
            avg_duration_secs: 120.0,
        }
    }

    #[test]
    fn full_match_fresh_popular_item_scores_one() {
        let now = Utc::now();
        let content = ContentItem::new("content_1", 1, "Calculus Basics")
            .with_topics(vec!["math".to_string(), "physics".to_string()])
            .with_popularity(1.0)
            .published_at(now);

        let score = relevance_score(&content, &prefs(), now);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recency_is_zero_past_the_horizon() {
        let now = Utc::now();
        let content = ContentItem::new("content_1", 9, "Old Lecture")
            .with_popularity(0.0)
            .published_at(now - Duration::days(250));

        // No topic or channel match either, so only recency could contribute.
        let score = relevance_score(&content, &prefs(), now);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn cold_user_scores_only_recency_and_popularity() {
        let now = Utc::now();
        let content = ContentItem::new("content_1", 1, "Fresh Upload")
            .with_topics(vec!["math".to_string()])
            .with_popularity(0.5)
            .published_at(now);

        let score = relevance_score(&content, &UserPreferences::cold(), now);
        assert!((score - (RECENCY_WEIGHT + POPULARITY_WEIGHT * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn recency_decays_linearly() {
        let now = Utc::now();
        let content = ContentItem::new("content_1", 9, "Half Decayed")
            .published_at(now - Duration::days(50));

        let score = relevance_score(&content, &UserPreferences::cold(), now);
        assert!((score - RECENCY_WEIGHT * 0.5).abs() < 1e-9);
    }

    #[test]
    fn engagement_score_is_one_at_every_knee() {
        let engagement = ChannelEngagement {
            channel_id: 1,
            views: 100,
            avg_watch_time_secs: 300.0,
            completion_rate: 1.0,
            likes: 50,
            shares: 20,
            calculated_at: Utc::now(),
        };
        assert!((engagement_score(&engagement) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn engagement_metrics_saturate() {
        let modest = ChannelEngagement {
            channel_id: 1,
            views: 100,
            avg_watch_time_secs: 300.0,
            completion_rate: 0.5,
            likes: 50,
            shares: 20,
            calculated_at: Utc::now(),
        };
        let viral = ChannelEngagement {
            views: 1_000_000,
            avg_watch_time_secs: 10_000.0,
            likes: 90_000,
            shares: 40_000,
            ..modest.clone()
        };
        assert!((engagement_score(&viral) - engagement_score(&modest)).abs() < 1e-9);
    }

    #[test]
    fn reward_order_breaks_ties_by_channel_id() {
        let mut scores = vec![(3u32, 0.5), (1, 0.5), (2, 0.9)];
        scores.sort_by(reward_rank_order);
        let ids: Vec<u32> = scores.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn reward_tiers_sum_to_the_whole_pool() {
        let total: f64 = REWARD_TIERS.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
