//! School endpoints

use super::{created, CreatedResponse};
use crate::db::schools::insert_school;
use crate::validation::require_text;
use crate::{ApiResult, AppState};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// POST /schools
///
/// **Errors:**
/// - 400 Bad Request: a blank field
/// - 409 Conflict: a school with this name already exists in this state
pub async fn create_school(
    State(state): State<AppState>,
    Json(payload): Json<CreateSchoolRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let name = require_text("name", &payload.name)?;
    let city = require_text("city", &payload.city)?;
    let region = require_text("state", &payload.state)?;
    let country = require_text("country", &payload.country)?;

    let id = insert_school(&state.db, &name, &city, &region, &country).await?;

    Ok(created(id, "School created successfully"))
}

pub fn school_routes() -> Router<AppState> {
    Router::new().route("/schools", post(create_school))
}
