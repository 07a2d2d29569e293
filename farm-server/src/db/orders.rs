//! Reconciled-order ledger operations
//!
//! One row per order id ever reconciled. Claiming is an
//! `INSERT ... ON CONFLICT DO NOTHING`, so exactly one caller wins even
//! when the same order id is replayed concurrently. Both operations run
//! on the reconciliation transaction supplied by the caller: an aborted
//! reconciliation releases its claim.

use sqlx::PgConnection;

/// Claim an order id for reconciliation. Returns `false` when the id was
/// already claimed (replay).
pub async fn claim(conn: &mut PgConnection, order_id: &str, now: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO reconciled_orders (order_id, harvested, created_at)
         VALUES ($1, 0, $2)
         ON CONFLICT (order_id) DO NOTHING",
    )
    .bind(order_id)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Record the oyster quantity harvested for a claimed order
pub async fn record_harvest(
    conn: &mut PgConnection,
    order_id: &str,
    quantity: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE reconciled_orders SET harvested = $2 WHERE order_id = $1")
        .bind(order_id)
        .bind(quantity)
        .execute(conn)
        .await?;
    Ok(())
}
