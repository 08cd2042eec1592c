//! Professor endpoints

use super::{created, CreatedResponse};
use crate::db::professors::{attach_courses, insert_professor, professor_details, ProfessorDetails};
use crate::validation::{normalize_course_code, require_text};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use wizards_common::stats::ProfessorAggregate;

#[derive(Debug, Deserialize)]
pub struct CreateProfessorRequest {
    pub name: String,
    /// Department abbreviation
    pub department: String,
    pub school_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AttachCoursesResponse {
    pub message: String,
    pub professor_id: i64,
    pub newly_linked: u64,
    /// Aggregates after the new links were counted
    pub statistics: ProfessorAggregate,
}

/// POST /professors
///
/// **Errors:**
/// - 404 Not Found: unknown department
/// - 409 Conflict: a professor with this name already exists
pub async fn create_professor(
    State(state): State<AppState>,
    Json(payload): Json<CreateProfessorRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let name = require_text("name", &payload.name)?;
    let department = require_text("department", &payload.department)?;

    let id = insert_professor(&state.db, &name, &department, payload.school_id).await?;

    Ok(created(id, "Professor created successfully"))
}

/// GET /professors/:name
pub async fn get_professor(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ProfessorDetails>> {
    Ok(Json(professor_details(&state.db, &name).await?))
}

/// POST /professors/:name/courses
///
/// **Request:** `["CSC365", "CSC 101"]`
///
/// Linking is idempotent. The professor's aggregates are recomputed in the
/// same transaction as the new links.
pub async fn post_professor_courses(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(codes): Json<Vec<String>>,
) -> ApiResult<Json<AttachCoursesResponse>> {
    if codes.is_empty() {
        return Err(ApiError::BadRequest("No course codes given".to_string()));
    }

    let mut normalized: Vec<String> = Vec::with_capacity(codes.len());
    for code in &codes {
        let code = normalize_course_code(code)?;
        if !normalized.contains(&code) {
            normalized.push(code);
        }
    }

    let attached = attach_courses(&state.db, &name, &normalized).await?;

    Ok(Json(AttachCoursesResponse {
        message: format!(
            "Attached {} course(s) to professor '{}'",
            normalized.len(),
            name
        ),
        professor_id: attached.professor_id,
        newly_linked: attached.newly_linked,
        statistics: attached.statistics,
    }))
}

pub fn professor_routes() -> Router<AppState> {
    Router::new()
        .route("/professors", post(create_professor))
        .route("/professors/:name", get(get_professor))
        .route("/professors/:name/courses", post(post_professor_courses))
}
