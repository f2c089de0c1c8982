//! Axum surface exposing the ranking engine.
//!
//! The server is stateless: callers post their full signal snapshot with
//! every request. Feed handlers never fail — the engine degrades to a
//! shorter or empty list when the upstream is unavailable.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::engine::RecommendationEngine;
use crate::types::{Candidate, HomeFeed, RankingSignals};

/// Request body shared by both feed endpoints.
#[derive(Debug, Deserialize)]
pub struct FeedRequest {
    #[serde(default)]
    pub signals: RankingSignals,
    #[serde(default = "default_page")]
    pub page: u32,
    /// Ids already surfaced in the caller's session (shorts feed only).
    #[serde(default)]
    pub seen_ids: Vec<String>,
}

fn default_page() -> u32 {
    1
}

/// Main application loop, setting up and running the Axum-based API server.
pub async fn serve(engine: Arc<RecommendationEngine>) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/status", get(status_check))
        .route("/feed", post(recommended_feed))
        .route("/shorts", post(shorts_feed))
        .with_state(engine);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{}", port);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn status_check() -> &'static str {
    "OK"
}

async fn recommended_feed(
    State(engine): State<Arc<RecommendationEngine>>,
    Json(request): Json<FeedRequest>,
) -> Json<HomeFeed> {
    Json(engine.recommended_feed(&request.signals, request.page).await)
}

async fn shorts_feed(
    State(engine): State<Arc<RecommendationEngine>>,
    Json(request): Json<FeedRequest>,
) -> Json<Vec<Candidate>> {
    Json(
        engine
            .shorts_feed(&request.signals, request.page, &request.seen_ids)
            .await,
    )
}
