//! Review ingestion
//!
//! A review is inserted together with its tag links and the refreshed
//! aggregates of its course and of every professor teaching that course,
//! all under one transaction. Either everything commits or nothing does.

use super::tags::{link_tag, upsert_tag};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use wizards_common::db::begin_write;
use wizards_common::stats::{recompute_course, recompute_professor};
use wizards_common::{Error, Result};

/// A validated review submission
#[derive(Debug, Clone)]
pub struct NewReview {
    pub course_code: String,
    pub professor_name: String,
    pub term: String,
    pub difficulty: i64,
    pub overall_rating: i64,
    pub workload_rating: i64,
    pub comments: String,
    pub tags: Vec<String>,
}

#[derive(Debug, FromRow)]
struct Pairing {
    course_id: i64,
    professor_id: i64,
}

/// Store a review and refresh the aggregates it touches, returning its id
pub async fn ingest_review(pool: &SqlitePool, review: &NewReview) -> Result<i64> {
    let mut tx = begin_write(pool).await?;

    let pairings: Vec<Pairing> = sqlx::query_as(
        r#"
        SELECT c.id AS course_id, p.id AS professor_id
        FROM course c
        JOIN professors_courses pc ON pc.course_id = c.id
        JOIN professor p ON p.id = pc.professor_id
        WHERE UPPER(c.course_code) = UPPER(?) AND p.name = ?
        LIMIT 2
        "#,
    )
    .bind(&review.course_code)
    .bind(&review.professor_name)
    .fetch_all(&mut *tx)
    .await?;

    let pairing = match pairings.as_slice() {
        [] => {
            return Err(Error::NotFound(format!(
                "Professor '{}' is not assigned to course {}",
                review.professor_name, review.course_code
            )))
        }
        [pairing] => pairing,
        _ => {
            return Err(Error::Conflict(format!(
                "Professor '{}' teaches more than one course coded {}",
                review.professor_name, review.course_code
            )))
        }
    };
    debug!(
        course_id = pairing.course_id,
        professor_id = pairing.professor_id,
        "Resolved review pairing"
    );

    let review_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO review
            (course_id, term, difficulty, overall_rating, workload_rating, comments)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(pairing.course_id)
    .bind(&review.term)
    .bind(review.difficulty)
    .bind(review.overall_rating)
    .bind(review.workload_rating)
    .bind(&review.comments)
    .fetch_one(&mut *tx)
    .await?;

    for tag in &review.tags {
        let tag_id = upsert_tag(&mut tx, tag).await?;
        link_tag(&mut tx, review_id, tag_id).await?;
    }

    let course = recompute_course(&mut tx, pairing.course_id).await?;

    // Every professor of the course sees the new review, not just the one named
    let professor_ids: Vec<i64> =
        sqlx::query_scalar("SELECT professor_id FROM professors_courses WHERE course_id = ?")
            .bind(pairing.course_id)
            .fetch_all(&mut *tx)
            .await?;

    for professor_id in &professor_ids {
        recompute_professor(&mut tx, *professor_id).await?;
    }

    tx.commit().await?;

    info!(
        review_id,
        course_id = pairing.course_id,
        course_avg_rating = course.avg_rating,
        professors = professor_ids.len(),
        "Review ingested"
    );

    Ok(review_id)
}
