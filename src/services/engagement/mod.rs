use crate::config::Config;
use crate::models::*;
use crate::storage::{CompletionRateProvider, EngagementStore, InteractionStore};
use crate::utils::mean;
use anyhow::Result;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

pub struct EngagementService {
    interactions: Arc<dyn InteractionStore>,
    engagement: Arc<dyn EngagementStore>,
    completion_rates: Arc<dyn CompletionRateProvider>,
    config: Arc<Config>,
}

impl EngagementService {
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        engagement: Arc<dyn EngagementStore>,
        completion_rates: Arc<dyn CompletionRateProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            interactions,
            engagement,
            completion_rates,
            config,
        }
    }

    /// Roll interaction events up into one engagement row per active channel
    /// over the trailing window. Channels with zero views in the window get
    /// no row at all; that sparsity filter is what makes them ineligible for
    /// rewards downstream.
    ///
    /// Returns the number of channels a row was written for.
    pub async fn calculate(&self) -> Result<usize> {
        let now = Utc::now();
        let window_start = now - Duration::days(self.config.engagement.window_days);
        let mut rows_written = 0;

        for &channel_id in &self.config.engagement.channel_ids {
            let views = self
                .interactions
                .events_in_window(channel_id, InteractionKind::View, window_start, now)
                .await?;

            if views.is_empty() {
                continue;
            }

            let likes = self
                .interactions
                .events_in_window(channel_id, InteractionKind::Like, window_start, now)
                .await?;
            let shares = self
                .interactions
                .events_in_window(channel_id, InteractionKind::Share, window_start, now)
                .await?;

            let avg_watch_time_secs = mean(views.iter().map(|e| e.duration_secs as f64));

            // Injected signal; only sampled for channels that pass the view
            // filter.
            let completion_rate = self.completion_rates.completion_rate(channel_id).await?;

            self.engagement
                .append(ChannelEngagement {
                    channel_id,
                    views: views.len() as u64,
                    avg_watch_time_secs,
                    completion_rate,
                    likes: likes.len() as u64,
                    shares: shares.len() as u64,
                    calculated_at: now,
                })
                .await?;

            rows_written += 1;
        }

        info!(
            "Engagement run complete: {} of {} candidate channels active in the last {} days",
            rows_written,
            self.config.engagement.channel_ids.len(),
            self.config.engagement.window_days
        );
        Ok(rows_written)
    }
}
