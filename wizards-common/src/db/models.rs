//! Database models
//!
//! One struct per persisted row shape. Aggregate columns on `Course` and
//! `Professor` are written only by [`crate::stats`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub abbrev: String,
    pub school_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub course_code: String,
    pub name: String,
    pub department_id: i64,
    pub avg_workload: f64,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Professor {
    pub id: i64,
    pub name: String,
    pub department_id: i64,
    pub avg_rating: f64,
    pub avg_difficulty: f64,
    pub avg_workload: f64,
    pub total_reviews: i64,
}

/// Review row; immutable once inserted
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub course_id: i64,
    pub term: String,
    pub difficulty: i64,
    pub overall_rating: i64,
    pub workload_rating: i64,
    pub comments: String,
    pub created_at: NaiveDateTime,
}

/// Tag name with its occurrence count for a scope (course, professor, department)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}
