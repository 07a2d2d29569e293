//! Product database operations

use shared::models::{Product, ProductUpdate};
use sqlx::{PgConnection, PgPool};

use super::BoxError;

/// List active products for the public catalog
pub async fn list_active(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, name, price, category, inventory_count, description, is_active, updated_at
         FROM products WHERE is_active ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

/// List every product, including inactive ones (admin)
pub async fn list_all(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, name, price, category, inventory_count, description, is_active, updated_at
         FROM products ORDER BY name",
    )
    .fetch_all(pool)
    .await
}

/// Stock decrement outcome: inventory before and after, for one product row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decrement {
    pub before: i64,
    pub after: i64,
}

impl Decrement {
    /// Quantity actually subtracted
    pub fn applied(&self) -> i64 {
        self.before - self.after
    }
}

/// Decrement a product's stock by name (case-insensitive), floored at zero.
///
/// Runs on the caller's reconciliation transaction. The UPDATE itself is
/// a single conditional statement with a `FOR UPDATE` target, so
/// concurrent orders cannot interleave between read and write, and the
/// description-mirror refresh lands in the same transaction. Returns
/// `None` when no product matches the name.
pub async fn decrement_inventory(
    conn: &mut PgConnection,
    name: &str,
    quantity: i64,
    now: i64,
) -> Result<Option<Decrement>, BoxError> {
    let row: Option<(i64, i64, i64, Option<String>)> = sqlx::query_as(
        r#"
        WITH target AS (
            SELECT id, inventory_count AS before_count
            FROM products
            WHERE lower(name) = lower($1)
            FOR UPDATE
        )
        UPDATE products p
        SET inventory_count = GREATEST(p.inventory_count - $2, 0),
            updated_at = $3
        FROM target t
        WHERE p.id = t.id
        RETURNING p.id, t.before_count, p.inventory_count, p.description
        "#,
    )
    .bind(name)
    .bind(quantity)
    .bind(now)
    .fetch_optional(&mut *conn)
    .await?;

    let Some((id, before, after, description)) = row else {
        return Ok(None);
    };

    if let Some(mirrored) = refresh_mirror(description.as_deref(), after) {
        sqlx::query("UPDATE products SET description = $2 WHERE id = $1")
            .bind(id)
            .bind(&mirrored)
            .execute(conn)
            .await?;
    }

    Ok(Some(Decrement { before, after }))
}

/// Update a product's price / stock / description / active flag (admin).
///
/// Absent fields are left unchanged via COALESCE. When the description
/// carries an inventory mirror it is recomputed in the same transaction.
pub async fn update(
    pool: &PgPool,
    id: i64,
    update: &ProductUpdate,
    now: i64,
) -> Result<Option<Product>, BoxError> {
    let mut tx = pool.begin().await?;

    let product: Option<Product> = sqlx::query_as(
        r#"
        UPDATE products
        SET price = COALESCE($2, price),
            inventory_count = COALESCE($3, inventory_count),
            description = COALESCE($4, description),
            is_active = COALESCE($5, is_active),
            updated_at = $6
        WHERE id = $1
        RETURNING id, name, price, category, inventory_count, description, is_active, updated_at
        "#,
    )
    .bind(id)
    .bind(update.price)
    .bind(update.inventory_count)
    .bind(&update.description)
    .bind(update.is_active)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(mut product) = product else {
        tx.rollback().await?;
        return Ok(None);
    };

    if let Some(mirrored) = refresh_mirror(product.description.as_deref(), product.inventory_count)
    {
        sqlx::query("UPDATE products SET description = $2 WHERE id = $1")
            .bind(product.id)
            .bind(&mirrored)
            .execute(&mut *tx)
            .await?;
        product.description = Some(mirrored);
    }

    tx.commit().await?;
    Ok(Some(product))
}

/// Rewrite the JSON inventory mirror embedded in a description, if any.
///
/// A description that parses as a JSON object with an `inventory` key is a
/// denormalized view of `inventory_count`; it is recomputed here so the two
/// never drift apart. Anything else (plain text, malformed JSON, JSON
/// without the key) is tolerated and left alone.
fn refresh_mirror(description: Option<&str>, count: i64) -> Option<String> {
    let text = description?;
    let mut value: serde_json::Value = serde_json::from_str(text).ok()?;
    let obj = value.as_object_mut()?;
    if !obj.contains_key("inventory") {
        return None;
    }
    let current = obj.get("inventory").and_then(|v| v.as_i64());
    if current == Some(count) {
        return None;
    }
    obj.insert("inventory".into(), serde_json::json!(count));
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_mirror_updates_inventory_key() {
        let desc = r#"{"text": "Fresh from the flats", "inventory": 10}"#;
        let out = refresh_mirror(Some(desc), 7).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["inventory"], 7);
        assert_eq!(v["text"], "Fresh from the flats");
    }

    #[test]
    fn test_refresh_mirror_already_consistent() {
        let desc = r#"{"inventory": 7}"#;
        assert!(refresh_mirror(Some(desc), 7).is_none());
    }

    #[test]
    fn test_refresh_mirror_tolerates_plain_text() {
        assert!(refresh_mirror(Some("Plain oyster prose"), 3).is_none());
        assert!(refresh_mirror(Some("{not json"), 3).is_none());
        assert!(refresh_mirror(None, 3).is_none());
    }

    #[test]
    fn test_refresh_mirror_ignores_json_without_key() {
        assert!(refresh_mirror(Some(r#"{"text": "no mirror here"}"#), 3).is_none());
        assert!(refresh_mirror(Some(r#"[1, 2, 3]"#), 3).is_none());
    }

    #[test]
    fn test_decrement_applied() {
        assert_eq!(Decrement { before: 10, after: 7 }.applied(), 3);
        assert_eq!(Decrement { before: 2, after: 0 }.applied(), 2);
        assert_eq!(Decrement { before: 0, after: 0 }.applied(), 0);
    }
}
