//! Statistics refresh endpoint
//!
//! Meant to be hit by an external scheduler; nothing in-process runs it.

use crate::{ApiResult, AppState};
use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use wizards_common::stats::recompute_all;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub courses_refreshed: u64,
    pub professors_refreshed: u64,
    pub refreshed_at: DateTime<Utc>,
}

/// POST /stats/refresh
///
/// Recomputes every course and professor aggregate in one transaction.
/// A store failure leaves all aggregates as they were (500).
pub async fn refresh_statistics(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    info!("Statistics refresh requested");
    let summary = recompute_all(&state.db).await?;

    Ok(Json(RefreshResponse {
        message: "Statistics refreshed successfully".to_string(),
        courses_refreshed: summary.courses,
        professors_refreshed: summary.professors,
        refreshed_at: summary.refreshed_at,
    }))
}

pub fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats/refresh", post(refresh_statistics))
}
