//! Professor persistence, course linking, and the professor detail view

use super::conflict_on_duplicate;
use super::courses::resolve_course;
use super::departments::resolve_department;
use super::tags::{top_professor_tags, PROFESSOR_TOP_TAGS};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::info;
use wizards_common::db::{begin_write, Professor, TagCount};
use wizards_common::stats::{recompute_professor, ProfessorAggregate};
use wizards_common::{Error, Result};

/// Course as listed under a professor
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseRef {
    pub id: i64,
    pub course_code: String,
    pub name: String,
}

/// A review as shown on a professor's page
#[derive(Debug, Serialize)]
pub struct ProfessorReview {
    pub id: i64,
    pub course_code: String,
    pub term: String,
    pub difficulty_rating: i64,
    pub overall_rating: i64,
    pub workload_estimate: i64,
    pub comments: String,
    pub tags: Vec<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct ProfessorDetails {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub total_reviews: i64,
    pub avg_rating: f64,
    pub avg_difficulty: f64,
    pub avg_workload: f64,
    pub courses: Vec<CourseRef>,
    /// Newest first
    pub reviews: Vec<ProfessorReview>,
    pub top_tags: Vec<TagCount>,
}

/// Result of linking courses to a professor
#[derive(Debug, Serialize)]
pub struct AttachedCourses {
    pub professor_id: i64,
    /// Links that did not exist before
    pub newly_linked: u64,
    pub statistics: ProfessorAggregate,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: i64,
    course_code: String,
    term: String,
    difficulty: i64,
    overall_rating: i64,
    workload_rating: i64,
    comments: String,
    created_at: NaiveDateTime,
}

#[derive(Debug, FromRow)]
struct ReviewTagRow {
    review_id: i64,
    name: String,
}

pub async fn resolve_professor(conn: &mut SqliteConnection, name: &str) -> Result<Professor> {
    sqlx::query_as(
        r#"
        SELECT id, name, department_id, avg_rating, avg_difficulty, avg_workload, total_reviews
        FROM professor
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Professor '{}' does not exist", name)))
}

pub async fn insert_professor(
    pool: &SqlitePool,
    name: &str,
    department: &str,
    school_id: Option<i64>,
) -> Result<i64> {
    let mut tx = begin_write(pool).await?;
    let dept = resolve_department(&mut tx, department, school_id).await?;

    let id: i64 =
        sqlx::query_scalar("INSERT INTO professor (name, department_id) VALUES (?, ?) RETURNING id")
            .bind(name)
            .bind(dept.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                conflict_on_duplicate(e, || format!("Professor '{}' already exists", name))
            })?;

    tx.commit().await?;

    info!(professor_id = id, department_id = dept.id, "Created professor {}", name);
    Ok(id)
}

/// Link courses to a professor and refresh the professor's aggregates
///
/// Already-linked courses are left alone. Reviews of newly linked courses
/// count toward the professor as soon as this commits. Any unknown code
/// aborts the whole request.
pub async fn attach_courses(
    pool: &SqlitePool,
    professor_name: &str,
    course_codes: &[String],
) -> Result<AttachedCourses> {
    let mut tx = begin_write(pool).await?;
    let professor = resolve_professor(&mut tx, professor_name).await?;

    let mut newly_linked = 0;
    for code in course_codes {
        let course = resolve_course(&mut tx, code).await?;

        let result = sqlx::query(
            "INSERT OR IGNORE INTO professors_courses (professor_id, course_id) VALUES (?, ?)",
        )
        .bind(professor.id)
        .bind(course.id)
        .execute(&mut *tx)
        .await?;
        newly_linked += result.rows_affected();
    }

    let statistics = recompute_professor(&mut tx, professor.id).await?;

    tx.commit().await?;

    info!(
        professor_id = professor.id,
        requested = course_codes.len(),
        newly_linked,
        "Attached courses to {}",
        professor_name
    );

    Ok(AttachedCourses {
        professor_id: professor.id,
        newly_linked,
        statistics,
    })
}

/// Everything shown on a professor's page
///
/// Averages are the stored aggregates; reviews and tags are read live.
pub async fn professor_details(pool: &SqlitePool, name: &str) -> Result<ProfessorDetails> {
    let mut conn = pool.acquire().await?;
    let professor = resolve_professor(&mut conn, name).await?;

    let department: String = sqlx::query_scalar("SELECT abbrev FROM department WHERE id = ?")
        .bind(professor.department_id)
        .fetch_one(&mut *conn)
        .await?;

    let courses: Vec<CourseRef> = sqlx::query_as(
        r#"
        SELECT c.id, c.course_code, c.name
        FROM course c
        JOIN professors_courses pc ON pc.course_id = c.id
        WHERE pc.professor_id = ?
        ORDER BY c.course_code
        "#,
    )
    .bind(professor.id)
    .fetch_all(&mut *conn)
    .await?;

    let review_rows: Vec<ReviewRow> = sqlx::query_as(
        r#"
        SELECT r.id, c.course_code, r.term, r.difficulty, r.overall_rating,
               r.workload_rating, r.comments, r.created_at
        FROM review r
        JOIN course c ON c.id = r.course_id
        JOIN professors_courses pc ON pc.course_id = r.course_id
        WHERE pc.professor_id = ?
        ORDER BY r.created_at DESC, r.id DESC
        "#,
    )
    .bind(professor.id)
    .fetch_all(&mut *conn)
    .await?;

    let tag_rows: Vec<ReviewTagRow> = sqlx::query_as(
        r#"
        SELECT rt.review_id, t.name
        FROM review_tags rt
        JOIN tag t ON t.id = rt.tag_id
        JOIN review r ON r.id = rt.review_id
        JOIN professors_courses pc ON pc.course_id = r.course_id
        WHERE pc.professor_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(professor.id)
    .fetch_all(&mut *conn)
    .await?;

    let mut tags_by_review: HashMap<i64, Vec<String>> = HashMap::new();
    for tag in tag_rows {
        tags_by_review.entry(tag.review_id).or_default().push(tag.name);
    }

    let reviews = review_rows
        .into_iter()
        .map(|r| ProfessorReview {
            tags: tags_by_review.remove(&r.id).unwrap_or_default(),
            id: r.id,
            course_code: r.course_code,
            term: r.term,
            difficulty_rating: r.difficulty,
            overall_rating: r.overall_rating,
            workload_estimate: r.workload_rating,
            comments: r.comments,
            created_at: r.created_at,
        })
        .collect();

    let top_tags = top_professor_tags(&mut conn, professor.id, PROFESSOR_TOP_TAGS).await?;

    Ok(ProfessorDetails {
        id: professor.id,
        name: professor.name,
        department,
        total_reviews: professor.total_reviews,
        avg_rating: professor.avg_rating,
        avg_difficulty: professor.avg_difficulty,
        avg_workload: professor.avg_workload,
        courses,
        reviews,
        top_tags,
    })
}
