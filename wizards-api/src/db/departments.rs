//! Department persistence and department-level statistics

use super::conflict_on_duplicate;
use super::schools::school_exists;
use super::tags::{top_department_tags, DEPARTMENT_TOP_TAGS};
use crate::pagination::Window;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::info;
use wizards_common::db::{begin_write, Department, TagCount};
use wizards_common::stats::round2_ratio;
use wizards_common::{Error, Result};

/// One page of a department listing
#[derive(Debug, Serialize)]
pub struct DepartmentPage {
    /// Departments matching the filter, ignoring the window
    pub total: i64,
    pub departments: Vec<Department>,
}

/// Rolled-up view of a department
#[derive(Debug, Serialize)]
pub struct DepartmentStatistics {
    pub department: Department,
    pub course_count: i64,
    pub professor_count: i64,
    pub total_reviews: i64,
    /// Mean of `avg_rating` over courses that have at least one review
    pub avg_rating: f64,
    /// Mean of `avg_workload` over courses that have at least one review
    pub avg_workload: f64,
    pub top_tags: Vec<TagCount>,
}

#[derive(Debug, FromRow)]
struct DepartmentCounts {
    course_count: i64,
    professor_count: i64,
    total_reviews: i64,
    reviewed_courses: i64,
    /// Sum of the reviewed courses' `avg_rating` in hundredths
    rating_hundredths: i64,
    avg_workload: Option<f64>,
}

pub async fn insert_department(
    pool: &SqlitePool,
    name: &str,
    abbrev: &str,
    school_id: i64,
) -> Result<i64> {
    let mut tx = begin_write(pool).await?;

    if !school_exists(&mut tx, school_id).await? {
        return Err(Error::NotFound(format!("School {} does not exist", school_id)));
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO department (name, abbrev, school_id) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(abbrev)
    .bind(school_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        conflict_on_duplicate(e, || {
            format!("Department '{}' ({}) already exists at school {}", name, abbrev, school_id)
        })
    })?;

    tx.commit().await?;

    info!(department_id = id, school_id, "Created department {}", abbrev);
    Ok(id)
}

/// List departments, optionally restricted to one school
pub async fn list_departments(
    pool: &SqlitePool,
    school_id: Option<i64>,
    window: Window,
) -> Result<DepartmentPage> {
    let mut conn = pool.acquire().await?;

    if let Some(id) = school_id {
        if !school_exists(&mut conn, id).await? {
            return Err(Error::NotFound(format!("School {} does not exist", id)));
        }
    }

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM department WHERE (? IS NULL OR school_id = ?)")
            .bind(school_id)
            .bind(school_id)
            .fetch_one(&mut *conn)
            .await?;

    let departments = sqlx::query_as(
        r#"
        SELECT id, name, abbrev, school_id
        FROM department
        WHERE (? IS NULL OR school_id = ?)
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(school_id)
    .bind(school_id)
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(&mut *conn)
    .await?;

    Ok(DepartmentPage { total, departments })
}

/// Find a department by abbreviation (case-insensitive)
///
/// Abbreviations are unique per school only, so without `school_id` a code
/// shared by several schools is a Conflict.
pub async fn resolve_department(
    conn: &mut SqliteConnection,
    abbrev: &str,
    school_id: Option<i64>,
) -> Result<Department> {
    let mut matches: Vec<Department> = sqlx::query_as(
        r#"
        SELECT id, name, abbrev, school_id
        FROM department
        WHERE UPPER(abbrev) = UPPER(?) AND (? IS NULL OR school_id = ?)
        LIMIT 2
        "#,
    )
    .bind(abbrev)
    .bind(school_id)
    .bind(school_id)
    .fetch_all(conn)
    .await?;

    match matches.len() {
        0 => Err(Error::NotFound(format!("Department {} does not exist", abbrev))),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::Conflict(format!(
            "Department {} exists at several schools; specify school_id",
            abbrev
        ))),
    }
}

pub async fn department_statistics(
    pool: &SqlitePool,
    abbrev: &str,
    school_id: Option<i64>,
) -> Result<DepartmentStatistics> {
    let mut conn = pool.acquire().await?;
    let department = resolve_department(&mut conn, abbrev, school_id).await?;

    let counts: DepartmentCounts = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM course WHERE department_id = ?) AS course_count,
            (SELECT COUNT(*) FROM professor WHERE department_id = ?) AS professor_count,
            (SELECT COUNT(*)
               FROM review r JOIN course c ON r.course_id = c.id
              WHERE c.department_id = ?) AS total_reviews,
            (SELECT COUNT(*) FROM course c
              WHERE c.department_id = ?
                AND EXISTS (SELECT 1 FROM review r WHERE r.course_id = c.id)) AS reviewed_courses,
            (SELECT COALESCE(SUM(CAST(ROUND(c.avg_rating * 100) AS INTEGER)), 0) FROM course c
              WHERE c.department_id = ?
                AND EXISTS (SELECT 1 FROM review r WHERE r.course_id = c.id)) AS rating_hundredths,
            (SELECT AVG(c.avg_workload) FROM course c
              WHERE c.department_id = ?
                AND EXISTS (SELECT 1 FROM review r WHERE r.course_id = c.id)) AS avg_workload
        "#,
    )
    .bind(department.id)
    .bind(department.id)
    .bind(department.id)
    .bind(department.id)
    .bind(department.id)
    .bind(department.id)
    .fetch_one(&mut *conn)
    .await?;

    let top_tags = top_department_tags(&mut conn, department.id, DEPARTMENT_TOP_TAGS).await?;

    Ok(DepartmentStatistics {
        department,
        course_count: counts.course_count,
        professor_count: counts.professor_count,
        total_reviews: counts.total_reviews,
        avg_rating: round2_ratio(counts.rating_hundredths, counts.reviewed_courses * 100),
        avg_workload: counts.avg_workload.unwrap_or(0.0),
        top_tags,
    })
}
