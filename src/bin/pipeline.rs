use scrollrec::{init_tracing, AppState, Config};
use scrollrec::simulation::DataSimulator;
use scrollrec::storage::{ContentCatalog, InteractionStore};
use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Pipeline stage to run: seed, recommend, engagement, rewards, or all.
    #[arg(short, long, default_value = "all")]
    stage: String,

    /// Seed for the demo data generator; omit for entropy.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    std::env::set_var("RUST_LOG", &args.log_level);
    init_tracing();

    info!("Starting ScrollRec pipeline run: {}", args.stage);

    let config = if std::path::Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, using default configuration");
        Config::default()
    };

    let state = AppState::new(config)?;

    match args.stage.as_str() {
        "seed" => {
            seed_demo_data(&state, args.seed).await?;
        }
        "recommend" => {
            run_recommendations(&state).await?;
        }
        "engagement" => {
            run_engagement(&state).await?;
        }
        "rewards" => {
            run_rewards(&state).await?;
        }
        "all" => {
            // Each stage is a discrete, non-overlapping unit of work; the
            // in-memory stores only live for this process, so "all" seeds
            // first.
            seed_demo_data(&state, args.seed).await?;
            run_recommendations(&state).await?;
            run_engagement(&state).await?;
            run_rewards(&state).await?;
        }
        _ => {
            error!("Unknown pipeline stage: {}", args.stage);
            return Err(anyhow::anyhow!("Invalid pipeline stage"));
        }
    }

    Ok(())
}

async fn seed_demo_data(state: &AppState, seed: Option<u64>) -> Result<()> {
    let sim_config = &state.config.simulation;
    let mut simulator = DataSimulator::new(seed);

    let channel_count = state.config.engagement.channel_ids.len() as u32;
    let catalog = simulator.sample_catalog(sim_config.catalog_size, channel_count);
    for item in &catalog {
        state.catalog.insert(item.clone()).await?;
    }

    // Several simulated batches so every user accrues real history.
    let mut recorded = 0;
    for _ in 0..20 {
        let events =
            simulator.sample_interactions(&sim_config.users, &catalog, sim_config.interactions_per_run);
        for event in events {
            state.interactions.record(event).await?;
            recorded += 1;
        }
    }

    info!(
        "Seeded {} content items and {} interactions for {} users",
        catalog.len(),
        recorded,
        sim_config.users.len()
    );
    Ok(())
}

async fn run_recommendations(state: &AppState) -> Result<()> {
    let users = state.config.simulation.users.clone();
    let generated = state.recommendation_service.generate_for_users(&users).await?;
    info!("Recommendation stage finished: {} users processed", generated);
    Ok(())
}

async fn run_engagement(state: &AppState) -> Result<()> {
    let channels = state.engagement_service.calculate().await?;
    info!("Engagement stage finished: {} active channels", channels);
    Ok(())
}

async fn run_rewards(state: &AppState) -> Result<()> {
    let records = state.reward_service.distribute().await?;
    for record in &records {
        info!(
            "Funded channel {}: {} {}",
            record.channel_id, record.reward_amount, record.reward_token
        );
    }
    // Demo output: the payout ledger for this run, as JSON.
    if !records.is_empty() {
        println!("{}", serde_json::to_string_pretty(&records)?);
    }
    Ok(())
}
