use crate::config::SimulationConfig;
use crate::models::*;
use crate::storage::{CompletionRateProvider, StoreError};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

const TOPIC_POOL: [&str; 6] = ["math", "physics", "history", "programming", "biology", "chemistry"];
const LEVEL_POOL: [&str; 3] = ["beginner", "intermediate", "advanced"];
const INTERACTION_KINDS: [InteractionKind; 4] = [
    InteractionKind::View,
    InteractionKind::Like,
    InteractionKind::Share,
    InteractionKind::Comment,
];

/// Stand-in for playback telemetry: a uniform draw per query. Real
/// deployments substitute a provider backed by the player pipeline.
pub struct SimulatedCompletionRates {
    rng: Mutex<StdRng>,
    min: f64,
    max: f64,
}

impl SimulatedCompletionRates {
    pub fn new(min: f64, max: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            min,
            max,
        }
    }

    pub fn from_config(config: &SimulationConfig, seed: Option<u64>) -> Self {
        Self::new(config.completion_rate_min, config.completion_rate_max, seed)
    }
}

#[async_trait::async_trait]
impl CompletionRateProvider for SimulatedCompletionRates {
    async fn completion_rate(&self, _channel_id: u32) -> Result<f64, StoreError> {
        let mut rng = self.rng.lock().await;
        Ok(rng.gen_range(self.min..self.max))
    }
}

/// Seedable generator for demo catalogs and interaction batches.
pub struct DataSimulator {
    rng: StdRng,
}

impl DataSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Educational demo catalog: each item gets a subject plus a difficulty
    /// level as topics, a publication date 1-100 days back, and a random
    /// popularity.
    pub fn sample_catalog(&mut self, size: usize, channel_count: u32) -> Vec<ContentItem> {
        let now = Utc::now();
        (1..=size)
            .map(|i| {
                let subject = TOPIC_POOL[self.rng.gen_range(0..TOPIC_POOL.len())];
                let level = LEVEL_POOL[self.rng.gen_range(0..LEVEL_POOL.len())];
                let days_back = self.rng.gen_range(1..100);
                let popularity: f64 = self.rng.gen();

                ContentItem::new(
                    format!("content_{}", i),
                    (i as u32 - 1) % channel_count + 1,
                    format!("Educational Content #{}", i),
                )
                .with_topics(vec![subject.to_string(), level.to_string()])
                .with_popularity(popularity)
                .published_at(now - Duration::days(days_back))
            })
            .collect()
    }

    /// A batch of random interactions against an existing catalog. Views get
    /// a 10-300 second watch duration; everything else stays at zero.
    pub fn sample_interactions(
        &mut self,
        users: &[String],
        catalog: &[ContentItem],
        count: usize,
    ) -> Vec<InteractionEvent> {
        let now = Utc::now();
        (0..count)
            .filter_map(|i| {
                if users.is_empty() || catalog.is_empty() {
                    return None;
                }
                let user = &users[self.rng.gen_range(0..users.len())];
                let content = &catalog[self.rng.gen_range(0..catalog.len())];
                let kind = INTERACTION_KINDS[self.rng.gen_range(0..INTERACTION_KINDS.len())];

                let mut event = InteractionEvent::new(
                    user.clone(),
                    content.content_id.clone(),
                    content.channel_id,
                    kind,
                )
                // Spread the batch across the recent past so windowed reads
                // have something to find.
                .at(now - Duration::minutes(self.rng.gen_range(0..60 * 24 * 6)));

                if kind == InteractionKind::View {
                    event = event.with_duration(self.rng.gen_range(10..=300));
                }
                Some(event)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_is_reproducible() {
        let a = DataSimulator::new(Some(42)).sample_catalog(20, 10);
        let b = DataSimulator::new(Some(42)).sample_catalog(20, 10);

        assert_eq!(a.len(), 20);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.content_id, y.content_id);
            assert_eq!(x.topics, y.topics);
            assert_eq!(x.popularity_score, y.popularity_score);
        }
    }

    #[test]
    fn catalog_items_are_well_formed() {
        let catalog = DataSimulator::new(Some(7)).sample_catalog(50, 10);
        for item in &catalog {
            assert!((1..=10).contains(&item.channel_id));
            assert_eq!(item.topics.len(), 2);
            assert!((0.0..=1.0).contains(&item.popularity_score));
            assert!(crate::utils::validation::validate_content_item(item).is_ok());
        }
    }

    #[test]
    fn only_views_carry_duration() {
        let mut sim = DataSimulator::new(Some(3));
        let catalog = sim.sample_catalog(10, 10);
        let users = vec!["0xabc".to_string()];
        let events = sim.sample_interactions(&users, &catalog, 100);

        assert_eq!(events.len(), 100);
        for event in &events {
            if event.kind == InteractionKind::View {
                assert!((10..=300).contains(&event.duration_secs));
            } else {
                assert_eq!(event.duration_secs, 0);
            }
        }
    }

    #[tokio::test]
    async fn simulated_completion_rate_stays_in_range() {
        let provider = SimulatedCompletionRates::new(0.4, 0.95, Some(1));
        for channel_id in 1..=10 {
            let rate = provider.completion_rate(channel_id).await.unwrap();
            assert!((0.4..0.95).contains(&rate));
        }
    }
}
