//! School persistence

use super::conflict_on_duplicate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use wizards_common::Result;

/// Insert a school; (name, state) must be unique
pub async fn insert_school(
    pool: &SqlitePool,
    name: &str,
    city: &str,
    state: &str,
    country: &str,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO school (name, city, state, country) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(name)
    .bind(city)
    .bind(state)
    .bind(country)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_duplicate(e, || format!("School '{}' already exists in {}", name, state)))?;

    info!(school_id = id, "Created school {}", name);
    Ok(id)
}

pub async fn school_exists(conn: &mut SqliteConnection, school_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM school WHERE id = ?)")
        .bind(school_id)
        .fetch_one(conn)
        .await?;

    Ok(exists)
}
