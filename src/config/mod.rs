use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub recommendation: RecommendationConfig,
    pub engagement: EngagementConfig,
    pub rewards: RewardsConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().unwrap()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// How many of the user's most recent events feed preference extraction.
    pub history_limit: usize,
    /// Preferred topics / channels kept per user.
    pub preference_depth: usize,
    /// Recommendations persisted per user per run.
    pub top_n: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementConfig {
    /// Trailing observation window, in days, ending at "now".
    pub window_days: i64,
    /// Candidate channels rolled up each run.
    pub channel_ids: Vec<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    pub pool_total: f64,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub catalog_size: usize,
    pub users: Vec<String>,
    pub interactions_per_run: usize,
    pub completion_rate_min: f64,
    pub completion_rate_max: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            recommendation: RecommendationConfig {
                history_limit: 50,
                preference_depth: 3,
                top_n: 10,
            },
            engagement: EngagementConfig {
                window_days: 7,
                channel_ids: (1..=10).collect(),
            },
            rewards: RewardsConfig {
                pool_total: 100.0,
                token: "S".to_string(),
            },
            simulation: SimulationConfig {
                catalog_size: 100,
                users: vec![
                    "0x1234567890123456789012345678901234567890".to_string(),
                    "0x2345678901234567890123456789012345678901".to_string(),
                    "0x3456789012345678901234567890123456789012".to_string(),
                ],
                interactions_per_run: 10,
                completion_rate_min: 0.4,
                completion_rate_max: 0.95,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SCROLLREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
