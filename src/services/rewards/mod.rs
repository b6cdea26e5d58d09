use crate::config::Config;
use crate::models::*;
use crate::scoring::{engagement_score, reward_rank_order, REWARD_TIERS};
use crate::storage::{EngagementStore, RewardLedger};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub struct RewardService {
    engagement: Arc<dyn EngagementStore>,
    ledger: Arc<dyn RewardLedger>,
    config: Arc<Config>,
}

impl RewardService {
    pub fn new(
        engagement: Arc<dyn EngagementStore>,
        ledger: Arc<dyn RewardLedger>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            engagement,
            ledger,
            config,
        }
    }

    /// Rank channels by their latest engagement score and pay the tier
    /// schedule out of the configured pool. With fewer eligible channels than
    /// tiers, the unused percentages are simply not paid out.
    pub async fn distribute(&self) -> Result<Vec<RewardRecord>> {
        let latest = self.engagement.latest_per_channel().await?;

        if latest.is_empty() {
            info!("No eligible channels; skipping reward distribution");
            return Ok(Vec::new());
        }

        let mut scores: Vec<(u32, f64)> = latest
            .iter()
            .map(|row| (row.channel_id, engagement_score(row)))
            .collect();
        scores.sort_by(reward_rank_order);

        let pool = self.config.rewards.pool_total;
        let mut records = Vec::new();

        for (&tier_share, &(channel_id, score)) in REWARD_TIERS.iter().zip(scores.iter()) {
            let record =
                RewardRecord::new(channel_id, pool * tier_share, self.config.rewards.token.clone());
            info!(
                "Channel {} ranked with engagement score {:.3}, rewarding {} {}",
                channel_id, score, record.reward_amount, record.reward_token
            );
            self.ledger.append(record.clone()).await?;
            records.push(record);
        }

        info!(
            "Distributed rewards to {} channels from a pool of {} {}",
            records.len(),
            pool,
            self.config.rewards.token
        );
        Ok(records)
    }
}
