//! Tag upsert, review linking, and read-time tag frequencies
//!
//! Tag frequencies are computed on every read and never persisted.

use sqlx::SqliteConnection;
use wizards_common::db::TagCount;
use wizards_common::Result;

pub const COURSE_TOP_TAGS: i64 = 5;
pub const DEPARTMENT_TOP_TAGS: i64 = 5;
pub const PROFESSOR_TOP_TAGS: i64 = 10;

/// Insert the tag if it is new; either way return its id
pub async fn upsert_tag(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO tag (name) VALUES (?)
        ON CONFLICT(name) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_one(conn)
    .await?;

    Ok(id)
}

pub async fn link_tag(conn: &mut SqliteConnection, review_id: i64, tag_id: i64) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO review_tags (review_id, tag_id) VALUES (?, ?)")
        .bind(review_id)
        .bind(tag_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Most frequent tags over one course's reviews
pub async fn top_course_tags(
    conn: &mut SqliteConnection,
    course_id: i64,
    limit: i64,
) -> Result<Vec<TagCount>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.name AS name, COUNT(*) AS count
        FROM review r
        JOIN review_tags rt ON rt.review_id = r.id
        JOIN tag t ON t.id = rt.tag_id
        WHERE r.course_id = ?
        GROUP BY t.id
        ORDER BY count DESC, t.name ASC
        LIMIT ?
        "#,
    )
    .bind(course_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;

    Ok(tags)
}

/// Most frequent tags over every course linked to a professor
pub async fn top_professor_tags(
    conn: &mut SqliteConnection,
    professor_id: i64,
    limit: i64,
) -> Result<Vec<TagCount>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.name AS name, COUNT(*) AS count
        FROM professors_courses pc
        JOIN review r ON r.course_id = pc.course_id
        JOIN review_tags rt ON rt.review_id = r.id
        JOIN tag t ON t.id = rt.tag_id
        WHERE pc.professor_id = ?
        GROUP BY t.id
        ORDER BY count DESC, t.name ASC
        LIMIT ?
        "#,
    )
    .bind(professor_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;

    Ok(tags)
}

/// Most frequent tags over every course in a department
pub async fn top_department_tags(
    conn: &mut SqliteConnection,
    department_id: i64,
    limit: i64,
) -> Result<Vec<TagCount>> {
    let tags = sqlx::query_as(
        r#"
        SELECT t.name AS name, COUNT(*) AS count
        FROM course c
        JOIN review r ON r.course_id = c.id
        JOIN review_tags rt ON rt.review_id = r.id
        JOIN tag t ON t.id = rt.tag_id
        WHERE c.department_id = ?
        GROUP BY t.id
        ORDER BY count DESC, t.name ASC
        LIMIT ?
        "#,
    )
    .bind(department_id)
    .bind(limit)
    .fetch_all(conn)
    .await?;

    Ok(tags)
}
