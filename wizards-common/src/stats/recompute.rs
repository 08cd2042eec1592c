//! Store-facing recomputation
//!
//! Scoped recomputes take a connection so they join the caller's
//! transaction: review ingestion inserts the review and refreshes the
//! aggregates under one commit. The sweep opens its own transaction.

use super::{CourseAggregate, ProfessorAggregate, ReviewScore, ReviewTotals};
use crate::db::begin_write;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Outcome of a full refresh sweep
#[derive(Debug, Clone, Serialize)]
pub struct RefreshSummary {
    /// Course rows rewritten
    pub courses: u64,
    /// Professor rows rewritten
    pub professors: u64,
    pub refreshed_at: DateTime<Utc>,
}

/// Recompute `avg_rating` and `avg_workload` for one course
///
/// Aggregates over every review whose `course_id` is this course.
pub async fn recompute_course(
    conn: &mut SqliteConnection,
    course_id: i64,
) -> Result<CourseAggregate> {
    let scores: Vec<ReviewScore> = sqlx::query_as(
        "SELECT difficulty, overall_rating, workload_rating FROM review WHERE course_id = ?",
    )
    .bind(course_id)
    .fetch_all(&mut *conn)
    .await?;

    let totals: ReviewTotals = scores.iter().collect();
    let aggregate = CourseAggregate::from_totals(&totals);

    let updated = write_course(conn, course_id, &aggregate).await?;
    if updated == 0 {
        return Err(Error::NotFound(format!("course {}", course_id)));
    }

    debug!(
        course_id,
        reviews = aggregate.review_count,
        avg_rating = aggregate.avg_rating,
        "Recomputed course statistics"
    );

    Ok(aggregate)
}

/// Recompute the four aggregate columns for one professor
///
/// A review counts toward a professor when its course is linked to the
/// professor in `professors_courses`; reviews carry no professor id.
pub async fn recompute_professor(
    conn: &mut SqliteConnection,
    professor_id: i64,
) -> Result<ProfessorAggregate> {
    let scores: Vec<ReviewScore> = sqlx::query_as(
        r#"
        SELECT r.difficulty, r.overall_rating, r.workload_rating
        FROM review r
        JOIN professors_courses pc ON r.course_id = pc.course_id
        WHERE pc.professor_id = ?
        "#,
    )
    .bind(professor_id)
    .fetch_all(&mut *conn)
    .await?;

    let totals: ReviewTotals = scores.iter().collect();
    let aggregate = ProfessorAggregate::from_totals(&totals);

    let updated = write_professor(conn, professor_id, &aggregate).await?;
    if updated == 0 {
        return Err(Error::NotFound(format!("professor {}", professor_id)));
    }

    debug!(
        professor_id,
        reviews = aggregate.total_reviews,
        avg_rating = aggregate.avg_rating,
        "Recomputed professor statistics"
    );

    Ok(aggregate)
}

/// Recompute every course and every professor in one transaction
///
/// Totals come from grouped sums rather than per-scope row scans, then go
/// through the same numeric policy as the scoped path. Nothing is written
/// unless the whole sweep succeeds.
pub async fn recompute_all(pool: &SqlitePool) -> Result<RefreshSummary> {
    let mut tx = begin_write(pool).await?;

    let course_totals: Vec<ScopedTotals> = sqlx::query_as(
        r#"
        SELECT
            c.id AS scope_id,
            COUNT(r.id) AS count,
            COALESCE(SUM(r.difficulty), 0) AS difficulty_sum,
            COALESCE(SUM(r.overall_rating), 0) AS rating_sum,
            COALESCE(SUM(r.workload_rating), 0) AS workload_sum
        FROM course c
        LEFT JOIN review r ON r.course_id = c.id
        GROUP BY c.id
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut courses = 0;
    for scoped in &course_totals {
        let aggregate = CourseAggregate::from_totals(&scoped.totals());
        courses += write_course(&mut tx, scoped.scope_id, &aggregate).await?;
    }

    let professor_totals: Vec<ScopedTotals> = sqlx::query_as(
        r#"
        SELECT
            p.id AS scope_id,
            COUNT(r.id) AS count,
            COALESCE(SUM(r.difficulty), 0) AS difficulty_sum,
            COALESCE(SUM(r.overall_rating), 0) AS rating_sum,
            COALESCE(SUM(r.workload_rating), 0) AS workload_sum
        FROM professor p
        LEFT JOIN professors_courses pc ON pc.professor_id = p.id
        LEFT JOIN review r ON r.course_id = pc.course_id
        GROUP BY p.id
        "#,
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut professors = 0;
    for scoped in &professor_totals {
        let aggregate = ProfessorAggregate::from_totals(&scoped.totals());
        professors += write_professor(&mut tx, scoped.scope_id, &aggregate).await?;
    }

    tx.commit().await?;

    info!(courses, professors, "Statistics refresh complete");

    Ok(RefreshSummary {
        courses,
        professors,
        refreshed_at: Utc::now(),
    })
}

/// One row of grouped sums keyed by course or professor id
#[derive(Debug, FromRow)]
struct ScopedTotals {
    scope_id: i64,
    count: i64,
    difficulty_sum: i64,
    rating_sum: i64,
    workload_sum: i64,
}

impl ScopedTotals {
    fn totals(&self) -> ReviewTotals {
        ReviewTotals {
            count: self.count,
            difficulty_sum: self.difficulty_sum,
            rating_sum: self.rating_sum,
            workload_sum: self.workload_sum,
        }
    }
}

async fn write_course(
    conn: &mut SqliteConnection,
    course_id: i64,
    aggregate: &CourseAggregate,
) -> Result<u64> {
    let result = sqlx::query("UPDATE course SET avg_workload = ?, avg_rating = ? WHERE id = ?")
        .bind(aggregate.avg_workload)
        .bind(aggregate.avg_rating)
        .bind(course_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

async fn write_professor(
    conn: &mut SqliteConnection,
    professor_id: i64,
    aggregate: &ProfessorAggregate,
) -> Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE professor
        SET avg_workload = ?, avg_difficulty = ?, avg_rating = ?, total_reviews = ?
        WHERE id = ?
        "#,
    )
    .bind(aggregate.avg_workload)
    .bind(aggregate.avg_difficulty)
    .bind(aggregate.avg_rating)
    .bind(aggregate.total_reviews)
    .bind(professor_id)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}
