//! Database initialization
//!
//! Opens (or creates) the SQLite store and brings the schema up to date.
//! Every table is created with `CREATE TABLE IF NOT EXISTS`, so running
//! initialization against an existing database is a no-op.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 1;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Pragmas go through the connect options so every pooled connection gets them,
    // not just the first one a PRAGMA statement happens to run on.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// The pool is pinned to a single connection that never expires: each SQLite
/// in-memory connection is its own database.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = "sqlite::memory:"
        .parse::<SqliteConnectOptions>()?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Begin a transaction that takes the write lock up front
///
/// A deferred transaction that reads before writing gets SQLITE_BUSY
/// immediately when it tries to upgrade while another writer holds the lock.
/// `BEGIN IMMEDIATE` waits under `busy_timeout` instead, so concurrent
/// writers queue.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Create every table and index (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_school_table(pool).await?;
    create_department_table(pool).await?;
    create_course_table(pool).await?;
    create_professor_table(pool).await?;
    create_tag_table(pool).await?;
    create_review_table(pool).await?;

    // Linking tables
    create_review_tags_table(pool).await?;
    create_professors_courses_table(pool).await?;

    create_indexes(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_school_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS school (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            country TEXT NOT NULL,
            CONSTRAINT uq_school_name_state UNIQUE (name, state)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_department_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS department (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            abbrev TEXT NOT NULL,
            school_id INTEGER NOT NULL REFERENCES school(id),
            CONSTRAINT department_name_school_unique UNIQUE (name, school_id),
            CONSTRAINT department_abbrev_school_unique UNIQUE (abbrev, school_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the course table
///
/// `avg_workload` and `avg_rating` are derived columns owned by the
/// statistics engine; they read as 0 until the first review lands.
async fn create_course_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS course (
            id INTEGER PRIMARY KEY,
            course_code TEXT NOT NULL,
            name TEXT NOT NULL,
            department_id INTEGER NOT NULL REFERENCES department(id),
            avg_workload REAL NOT NULL DEFAULT 0,
            avg_rating REAL NOT NULL DEFAULT 0,
            CONSTRAINT uq_course_code_department UNIQUE (course_code, department_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the professor table
///
/// The four aggregate columns are derived from reviews of every course
/// linked through `professors_courses`.
async fn create_professor_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professor (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            department_id INTEGER NOT NULL REFERENCES department(id),
            avg_rating REAL NOT NULL DEFAULT 0,
            avg_difficulty REAL NOT NULL DEFAULT 0,
            avg_workload REAL NOT NULL DEFAULT 0,
            total_reviews INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_tag_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tag (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the review table
///
/// Check constraints back up request validation at the store level.
async fn create_review_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review (
            id INTEGER PRIMARY KEY,
            course_id INTEGER NOT NULL REFERENCES course(id),
            term TEXT NOT NULL,
            difficulty INTEGER NOT NULL
                CONSTRAINT ck_review_difficulty CHECK (difficulty BETWEEN 1 AND 5),
            overall_rating INTEGER NOT NULL
                CONSTRAINT ck_review_overall_rating CHECK (overall_rating BETWEEN 1 AND 5),
            workload_rating INTEGER NOT NULL
                CONSTRAINT ck_review_workload CHECK (workload_rating BETWEEN 0 AND 168),
            comments TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_review_tags_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS review_tags (
            review_id INTEGER NOT NULL REFERENCES review(id),
            tag_id INTEGER NOT NULL REFERENCES tag(id),
            PRIMARY KEY (review_id, tag_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_professors_courses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professors_courses (
            professor_id INTEGER NOT NULL REFERENCES professor(id),
            course_id INTEGER NOT NULL REFERENCES course(id),
            PRIMARY KEY (professor_id, course_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<()> {
    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_review_course_id ON review(course_id)",
        "CREATE INDEX IF NOT EXISTS idx_professors_courses_course_id ON professors_courses(course_id)",
        "CREATE INDEX IF NOT EXISTS idx_course_department_id ON course(department_id)",
        "CREATE INDEX IF NOT EXISTS idx_professor_department_id ON professor(department_id)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}
