//! Course persistence and course read views
//!
//! Course codes reach this module already normalized (uppercase, no
//! spaces); lookups still compare case-insensitively so rows created by
//! other tools match.

use super::conflict_on_duplicate;
use super::departments::resolve_department;
use super::tags::{top_course_tags, COURSE_TOP_TAGS};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::info;
use wizards_common::db::{begin_write, Course, TagCount};
use wizards_common::stats::{ReviewScore, ReviewTotals};
use wizards_common::{Error, Result};

/// Column a course listing is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSort {
    Workload,
    Rating,
}

impl CourseSort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "workload" => Some(Self::Workload),
            "rating" => Some(Self::Rating),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Workload => "c.avg_workload",
            Self::Rating => "c.avg_rating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Professor as listed under a course
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfessorRef {
    pub id: i64,
    pub name: String,
}

/// Course with its department code, aggregates and teaching staff
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub id: i64,
    pub course_code: String,
    pub name: String,
    pub department: String,
    pub avg_rating: f64,
    pub avg_workload: f64,
    pub professors: Vec<ProfessorRef>,
}

/// Statistics view of one course
///
/// `avg_rating` and `avg_workload` are the stored aggregates;
/// `avg_difficulty` and `total_reviews` are computed at read time.
#[derive(Debug, Serialize)]
pub struct CourseStatistics {
    pub course_code: String,
    pub name: String,
    pub avg_rating: f64,
    pub avg_workload: f64,
    pub avg_difficulty: f64,
    pub total_reviews: i64,
    pub top_tags: Vec<TagCount>,
}

#[derive(Debug, FromRow)]
struct CourseProfessorRow {
    course_id: i64,
    course_code: String,
    name: String,
    department: String,
    avg_rating: f64,
    avg_workload: f64,
    professor_id: Option<i64>,
    professor_name: Option<String>,
}

/// Find a course by code
///
/// A code is unique within a department only; a code shared across
/// departments is a Conflict.
pub async fn resolve_course(conn: &mut SqliteConnection, course_code: &str) -> Result<Course> {
    let mut matches: Vec<Course> = sqlx::query_as(
        r#"
        SELECT id, course_code, name, department_id, avg_workload, avg_rating
        FROM course
        WHERE UPPER(course_code) = UPPER(?)
        LIMIT 2
        "#,
    )
    .bind(course_code)
    .fetch_all(conn)
    .await?;

    match matches.len() {
        0 => Err(Error::NotFound(format!("Course {} does not exist", course_code))),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::Conflict(format!(
            "Course code {} is used by several departments",
            course_code
        ))),
    }
}

/// Create a course under the department with abbreviation `department`
pub async fn insert_course(
    pool: &SqlitePool,
    course_code: &str,
    name: &str,
    department: &str,
    school_id: Option<i64>,
) -> Result<i64> {
    let mut tx = begin_write(pool).await?;
    let dept = resolve_department(&mut tx, department, school_id).await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO course (course_code, name, department_id) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(course_code)
    .bind(name)
    .bind(dept.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        conflict_on_duplicate(e, || {
            format!("Course {} already exists in {}", course_code, dept.abbrev)
        })
    })?;

    tx.commit().await?;

    info!(course_id = id, department_id = dept.id, "Created course {}", course_code);
    Ok(id)
}

/// List courses with their professors, ordered by a stored aggregate
///
/// Courses nobody teaches yet are included with an empty professor list.
pub async fn list_courses(
    pool: &SqlitePool,
    department: Option<&str>,
    sort: CourseSort,
    order: SortOrder,
) -> Result<Vec<CourseSummary>> {
    let sql = format!(
        r#"
        SELECT
            c.id AS course_id,
            c.course_code,
            c.name,
            d.abbrev AS department,
            c.avg_rating,
            c.avg_workload,
            p.id AS professor_id,
            p.name AS professor_name
        FROM course c
        JOIN department d ON d.id = c.department_id
        LEFT JOIN professors_courses pc ON pc.course_id = c.id
        LEFT JOIN professor p ON p.id = pc.professor_id
        WHERE (? IS NULL OR UPPER(d.abbrev) = UPPER(?))
        ORDER BY {} {}, c.id, p.name
        "#,
        sort.column(),
        order.keyword()
    );

    let rows: Vec<CourseProfessorRow> = sqlx::query_as(&sql)
        .bind(department)
        .bind(department)
        .fetch_all(pool)
        .await?;

    Ok(group_professors(rows))
}

/// Course detail: the course, its department code, and who teaches it
pub async fn course_detail(pool: &SqlitePool, course_code: &str) -> Result<CourseSummary> {
    let mut conn = pool.acquire().await?;
    let course = resolve_course(&mut conn, course_code).await?;

    let rows: Vec<CourseProfessorRow> = sqlx::query_as(
        r#"
        SELECT
            c.id AS course_id,
            c.course_code,
            c.name,
            d.abbrev AS department,
            c.avg_rating,
            c.avg_workload,
            p.id AS professor_id,
            p.name AS professor_name
        FROM course c
        JOIN department d ON d.id = c.department_id
        LEFT JOIN professors_courses pc ON pc.course_id = c.id
        LEFT JOIN professor p ON p.id = pc.professor_id
        WHERE c.id = ?
        ORDER BY p.name
        "#,
    )
    .bind(course.id)
    .fetch_all(&mut *conn)
    .await?;

    group_professors(rows)
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound(format!("Course {} does not exist", course_code)))
}

pub async fn course_professors(pool: &SqlitePool, course_code: &str) -> Result<Vec<ProfessorRef>> {
    let mut conn = pool.acquire().await?;
    let course = resolve_course(&mut conn, course_code).await?;

    let professors = sqlx::query_as(
        r#"
        SELECT p.id, p.name
        FROM professor p
        JOIN professors_courses pc ON pc.professor_id = p.id
        WHERE pc.course_id = ?
        ORDER BY p.name
        "#,
    )
    .bind(course.id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(professors)
}

pub async fn course_statistics(pool: &SqlitePool, course_code: &str) -> Result<CourseStatistics> {
    let mut conn = pool.acquire().await?;
    let course = resolve_course(&mut conn, course_code).await?;

    let scores: Vec<ReviewScore> = sqlx::query_as(
        "SELECT difficulty, overall_rating, workload_rating FROM review WHERE course_id = ?",
    )
    .bind(course.id)
    .fetch_all(&mut *conn)
    .await?;
    let totals: ReviewTotals = scores.iter().collect();

    let top_tags = top_course_tags(&mut conn, course.id, COURSE_TOP_TAGS).await?;

    Ok(CourseStatistics {
        course_code: course.course_code,
        name: course.name,
        avg_rating: course.avg_rating,
        avg_workload: course.avg_workload,
        avg_difficulty: totals.mean_difficulty(),
        total_reviews: totals.count,
        top_tags,
    })
}

/// Fold one-row-per-(course, professor) results into one summary per course
///
/// Rows for a course are contiguous because every query orders by course
/// before professor.
fn group_professors(rows: Vec<CourseProfessorRow>) -> Vec<CourseSummary> {
    let mut courses: Vec<CourseSummary> = Vec::new();

    for row in rows {
        let professor = match (row.professor_id, row.professor_name) {
            (Some(id), Some(name)) => Some(ProfessorRef { id, name }),
            _ => None,
        };

        match courses.last_mut() {
            Some(last) if last.id == row.course_id => last.professors.extend(professor),
            _ => courses.push(CourseSummary {
                id: row.course_id,
                course_code: row.course_code,
                name: row.name,
                department: row.department,
                avg_rating: row.avg_rating,
                avg_workload: row.avg_workload,
                professors: professor.into_iter().collect(),
            }),
        }
    }

    courses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(course_id: i64, professor: Option<(i64, &str)>) -> CourseProfessorRow {
        CourseProfessorRow {
            course_id,
            course_code: format!("CSC{}", course_id),
            name: format!("Course {}", course_id),
            department: "CSC".to_string(),
            avg_rating: 0.0,
            avg_workload: 0.0,
            professor_id: professor.map(|(id, _)| id),
            professor_name: professor.map(|(_, name)| name.to_string()),
        }
    }

    #[test]
    fn test_group_professors_collapses_rows() {
        let rows = vec![
            row(1, Some((1, "Prof. Jones"))),
            row(1, Some((2, "Prof. Smith"))),
            row(2, None),
            row(3, Some((2, "Prof. Smith"))),
        ];

        let courses = group_professors(rows);

        assert_eq!(courses.len(), 3);
        assert_eq!(courses[0].professors.len(), 2);
        assert!(courses[1].professors.is_empty());
        assert_eq!(courses[2].professors[0].name, "Prof. Smith");
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!(CourseSort::parse("rating"), Some(CourseSort::Rating));
        assert_eq!(CourseSort::parse("Rating"), None);
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("up"), None);
    }
}
