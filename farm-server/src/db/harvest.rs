//! Harvest counter database operations

use shared::models::HarvestCount;
use sqlx::{PgConnection, PgPool};

/// Add to the running oyster total, on the caller's transaction. The
/// counter row is created by the initial migration and never deleted.
pub async fn increment(conn: &mut PgConnection, quantity: i64) -> Result<i64, sqlx::Error> {
    let (total,): (i64,) =
        sqlx::query_as("UPDATE harvest_counter SET total = total + $1 WHERE id RETURNING total")
            .bind(quantity)
            .fetch_one(conn)
            .await?;
    Ok(total)
}

/// Current running total
pub async fn total(pool: &PgPool) -> Result<HarvestCount, sqlx::Error> {
    sqlx::query_as::<_, HarvestCount>("SELECT total FROM harvest_counter WHERE id")
        .fetch_one(pool)
        .await
}
