pub mod config;
pub mod models;
pub mod scoring;
pub mod services;
pub mod simulation;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use models::*;

use anyhow::Result;
use std::sync::Arc;

use services::engagement::EngagementService;
use services::recommendation::RecommendationService;
use services::rewards::RewardService;
use simulation::SimulatedCompletionRates;
use storage::{
    CompletionRateProvider, ContentCatalog, EngagementStore, InMemoryContentCatalog,
    InMemoryEngagementStore, InMemoryInteractionStore, InMemoryRecommendationStore,
    InMemoryRewardLedger, InteractionStore, RecommendationStore, RewardLedger,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub interactions: Arc<dyn InteractionStore>,
    pub catalog: Arc<dyn ContentCatalog>,
    pub recommendation_store: Arc<dyn RecommendationStore>,
    pub engagement_store: Arc<dyn EngagementStore>,
    pub reward_ledger: Arc<dyn RewardLedger>,
    pub recommendation_service: Arc<RecommendationService>,
    pub engagement_service: Arc<EngagementService>,
    pub reward_service: Arc<RewardService>,
}

impl AppState {
    /// Wire the pipeline against the in-memory stores and the simulated
    /// completion-rate signal.
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let completion_rates = Arc::new(SimulatedCompletionRates::from_config(
            &config.simulation,
            None,
        ));
        Self::with_stores(
            config,
            Arc::new(InMemoryInteractionStore::new()),
            Arc::new(InMemoryContentCatalog::new()),
            Arc::new(InMemoryRecommendationStore::new()),
            Arc::new(InMemoryEngagementStore::new()),
            Arc::new(InMemoryRewardLedger::new()),
            completion_rates,
        )
    }

    /// Wire the pipeline against caller-supplied store implementations.
    /// Stores are acquired once here and passed by reference through the
    /// services for the lifetime of the state.
    #[allow(clippy::too_many_arguments)]
    pub fn with_stores(
        config: Arc<Config>,
        interactions: Arc<dyn InteractionStore>,
        catalog: Arc<dyn ContentCatalog>,
        recommendation_store: Arc<dyn RecommendationStore>,
        engagement_store: Arc<dyn EngagementStore>,
        reward_ledger: Arc<dyn RewardLedger>,
        completion_rates: Arc<dyn CompletionRateProvider>,
    ) -> Result<Self> {
        let recommendation_service = Arc::new(RecommendationService::new(
            interactions.clone(),
            catalog.clone(),
            recommendation_store.clone(),
            config.clone(),
        ));

        let engagement_service = Arc::new(EngagementService::new(
            interactions.clone(),
            engagement_store.clone(),
            completion_rates,
            config.clone(),
        ));

        let reward_service = Arc::new(RewardService::new(
            engagement_store.clone(),
            reward_ledger.clone(),
            config.clone(),
        ));

        Ok(Self {
            config,
            interactions,
            catalog,
            recommendation_store,
            engagement_store,
            reward_ledger,
            recommendation_service,
            engagement_service,
            reward_service,
        })
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
