//! HTTP API handlers for wizards-api

pub mod courses;
pub mod departments;
pub mod health;
pub mod professors;
pub mod reviews;
pub mod schools;
pub mod stats;

pub use courses::course_routes;
pub use departments::department_routes;
pub use health::health_routes;
pub use professors::professor_routes;
pub use reviews::review_routes;
pub use schools::school_routes;
pub use stats::stats_routes;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Body of every 201 response
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

pub(crate) fn created(id: i64, message: impl Into<String>) -> (StatusCode, Json<CreatedResponse>) {
    (
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: message.into(),
        }),
    )
}
