use scrollrec::{init_tracing, AppState, Config};
use scrollrec::storage::{ContentCatalog, EngagementStore, InteractionStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RunSummary {
    processed: usize,
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "scrollrec-engine".to_string());
    status.insert("version".to_string(), "0.1.0".to_string());

    Json(ApiResponse::success(status))
}

async fn record_interaction(
    State(state): State<AppState>,
    Json(event): Json<scrollrec::InteractionEvent>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    if let Err(e) = scrollrec::utils::validation::validate_interaction_event(&event) {
        tracing::warn!("Rejected interaction event: {}", e);
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.interactions.record(event).await {
        Ok(()) => Ok(Json(ApiResponse::success("Interaction recorded".to_string()))),
        Err(e) => {
            tracing::error!("Failed to record interaction: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn ingest_content(
    State(state): State<AppState>,
    Json(item): Json<scrollrec::ContentItem>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    if let Err(e) = scrollrec::utils::validation::validate_content_item(&item) {
        tracing::warn!("Rejected content item: {}", e);
        return Err(StatusCode::BAD_REQUEST);
    }

    match state.catalog.insert(item).await {
        Ok(()) => Ok(Json(ApiResponse::success("Content ingested".to_string()))),
        Err(e) => {
            tracing::error!("Failed to ingest content: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<scrollrec::ResolvedRecommendation>>>, StatusCode> {
    match state.recommendation_service.latest_for_user(&user_id).await {
        Ok(items) => Ok(Json(ApiResponse::success(items))),
        Err(e) => {
            tracing::error!("Failed to fetch recommendations: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn get_channel_engagement(
    State(state): State<AppState>,
    Path(channel_id): Path<u32>,
) -> Result<Json<ApiResponse<scrollrec::ChannelEngagement>>, StatusCode> {
    match state.engagement_store.latest_for_channel(channel_id).await {
        Ok(Some(row)) => Ok(Json(ApiResponse::success(row))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to fetch channel engagement: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn run_recommendations(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RunSummary>>, StatusCode> {
    let users = state.config.simulation.users.clone();
    match state.recommendation_service.generate_for_users(&users).await {
        Ok(processed) => Ok(Json(ApiResponse::success(RunSummary { processed }))),
        Err(e) => {
            tracing::error!("Recommendation run failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn run_engagement(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RunSummary>>, StatusCode> {
    match state.engagement_service.calculate().await {
        Ok(processed) => Ok(Json(ApiResponse::success(RunSummary { processed }))),
        Err(e) => {
            tracing::error!("Engagement run failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn run_rewards(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<scrollrec::RewardRecord>>>, StatusCode> {
    match state.reward_service.distribute().await {
        Ok(records) => Ok(Json(ApiResponse::success(records))),
        Err(e) => {
            tracing::error!("Reward distribution failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/interactions", post(record_interaction))
        .route("/content", post(ingest_content))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route("/engagement/:channel_id", get(get_channel_engagement))
        .route("/runs/recommendations", post(run_recommendations))
        .route("/runs/engagement", post(run_engagement))
        .route("/runs/rewards", post(run_rewards))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::default();
    info!("Starting ScrollRec engine server with config: {:?}", config.server);

    let state = AppState::new(config.clone())?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Server listening on {}", config.server.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
