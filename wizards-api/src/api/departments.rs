//! Department endpoints

use super::{created, CreatedResponse};
use crate::db::departments::{
    department_statistics, insert_department, list_departments, DepartmentPage,
    DepartmentStatistics,
};
use crate::pagination::calculate_window;
use crate::validation::require_text;
use crate::{ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub abbrev: String,
    pub school_id: i64,
}

/// Query parameters for GET /departments
#[derive(Debug, Deserialize)]
pub struct ListDepartmentsParams {
    pub school_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SchoolScope {
    pub school_id: Option<i64>,
}

/// POST /departments
///
/// Abbreviations are stored uppercase.
pub async fn create_department(
    State(state): State<AppState>,
    Json(payload): Json<CreateDepartmentRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let name = require_text("name", &payload.name)?;
    let abbrev = require_text("abbrev", &payload.abbrev)?.to_ascii_uppercase();

    let id = insert_department(&state.db, &name, &abbrev, payload.school_id).await?;

    Ok(created(id, "Department created successfully"))
}

/// GET /departments?school_id=&limit=&offset=
pub async fn get_departments(
    State(state): State<AppState>,
    Query(params): Query<ListDepartmentsParams>,
) -> ApiResult<Json<DepartmentPage>> {
    let window = calculate_window(params.limit, params.offset);
    let page = list_departments(&state.db, params.school_id, window).await?;
    Ok(Json(page))
}

/// GET /departments/:abbrev/statistics[?school_id=]
pub async fn get_department_statistics(
    State(state): State<AppState>,
    Path(abbrev): Path<String>,
    Query(scope): Query<SchoolScope>,
) -> ApiResult<Json<DepartmentStatistics>> {
    let stats = department_statistics(&state.db, abbrev.trim(), scope.school_id).await?;
    Ok(Json(stats))
}

pub fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/departments", get(get_departments).post(create_department))
        .route("/departments/:abbrev/statistics", get(get_department_statistics))
}
