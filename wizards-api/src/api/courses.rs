//! Course endpoints

use super::{created, CreatedResponse};
use crate::db::courses::{
    course_detail, course_professors, course_statistics, insert_course, list_courses,
    CourseSort, CourseStatistics, CourseSummary, ProfessorRef, SortOrder,
};
use crate::validation::{normalize_course_code, require_text};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub name: String,
    /// Department abbreviation, e.g. `CSC`
    pub department: String,
    /// Needed only when the abbreviation exists at several schools
    pub school_id: Option<i64>,
}

/// Query parameters for GET /courses
#[derive(Debug, Deserialize)]
pub struct ListCoursesParams {
    pub department: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// POST /courses
///
/// **Errors:**
/// - 400 Bad Request: malformed course code or blank name
/// - 404 Not Found: unknown department
/// - 409 Conflict: code already used in that department
pub async fn create_course(
    State(state): State<AppState>,
    Json(payload): Json<CreateCourseRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let course_code = normalize_course_code(&payload.course_code)?;
    let name = require_text("name", &payload.name)?;
    let department = require_text("department", &payload.department)?;

    let id = insert_course(&state.db, &course_code, &name, &department, payload.school_id).await?;

    Ok(created(id, "Course created successfully"))
}

/// GET /courses?department=&sort_by=workload|rating&order=asc|desc
///
/// Defaults to highest workload first.
pub async fn get_courses(
    State(state): State<AppState>,
    Query(params): Query<ListCoursesParams>,
) -> ApiResult<Json<Vec<CourseSummary>>> {
    let sort_by = params.sort_by.as_deref().unwrap_or("workload");
    let sort = CourseSort::parse(sort_by).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Invalid sort_by '{}'. Use 'workload' or 'rating'.",
            sort_by
        ))
    })?;

    let order = params.order.as_deref().unwrap_or("desc");
    let order = SortOrder::parse(order).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid order '{}'. Use 'asc' or 'desc'.", order))
    })?;

    let department = params
        .department
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let courses = list_courses(&state.db, department, sort, order).await?;
    Ok(Json(courses))
}

/// GET /courses/:code
pub async fn get_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<CourseSummary>> {
    let code = normalize_course_code(&code)?;
    Ok(Json(course_detail(&state.db, &code).await?))
}

/// GET /courses/:code/professors
pub async fn get_course_professors(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Vec<ProfessorRef>>> {
    let code = normalize_course_code(&code)?;
    Ok(Json(course_professors(&state.db, &code).await?))
}

/// GET /courses/:code/statistics
pub async fn get_course_statistics(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<CourseStatistics>> {
    let code = normalize_course_code(&code)?;
    Ok(Json(course_statistics(&state.db, &code).await?))
}

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(get_courses).post(create_course))
        .route("/courses/:code", get(get_course))
        .route("/courses/:code/professors", get(get_course_professors))
        .route("/courses/:code/statistics", get(get_course_statistics))
}
