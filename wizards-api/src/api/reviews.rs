//! Review submission endpoint

use super::{created, CreatedResponse};
use crate::db::reviews::{ingest_review, NewReview};
use crate::validation::{
    check_comments, check_range, normalize_course_code, normalize_tags, normalize_term,
    require_text, RATING_RANGE, WORKLOAD_RANGE,
};
use crate::{ApiResult, AppState};
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

/// Request payload for POST /reviews
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    /// e.g. `CSC365`
    pub course_code: String,
    /// Exact professor name, e.g. `Prof. Smith`
    pub professor_name: String,
    /// e.g. `Spring 2025`
    pub term: String,
    pub difficulty_rating: i64,
    pub overall_rating: i64,
    /// Hours per week
    pub workload_estimate: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    pub comments: String,
}

impl CreateReviewRequest {
    /// Check every field and produce the canonical form stored
    pub fn validate(&self) -> ApiResult<NewReview> {
        Ok(NewReview {
            course_code: normalize_course_code(&self.course_code)?,
            professor_name: require_text("professor_name", &self.professor_name)?,
            term: normalize_term(&self.term)?,
            difficulty: check_range("difficulty_rating", self.difficulty_rating, &RATING_RANGE)?,
            overall_rating: check_range("overall_rating", self.overall_rating, &RATING_RANGE)?,
            workload_rating: check_range(
                "workload_estimate",
                self.workload_estimate,
                &WORKLOAD_RANGE,
            )?,
            comments: check_comments(&self.comments)?,
            tags: normalize_tags(&self.tags)?,
        })
    }
}

/// POST /reviews
///
/// **Behavior:**
/// 1. Validate the submission (nothing touches the store on failure)
/// 2. Resolve the (course, professor) pairing
/// 3. Insert the review and its tags, refresh course and professor aggregates
///
/// **Errors:**
/// - 400 Bad Request: any field out of range or malformed
/// - 404 Not Found: the professor is not assigned to the course
/// - 500 Internal Server Error: store failure; nothing was written
pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let review = payload.validate()?;
    let review_id = ingest_review(&state.db, &review).await?;

    Ok(created(review_id, "Review created successfully"))
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/reviews", post(create_review))
}
