//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in dollars
    pub price: f64,
    pub category: String,
    /// Tracked stock, never negative
    pub inventory_count: i64,
    /// Free-form description; may embed a JSON inventory mirror
    pub description: Option<String>,
    pub is_active: bool,
    /// Epoch milliseconds
    pub updated_at: i64,
}

/// Update product payload (admin)
///
/// Every field is optional; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub price: Option<f64>,
    pub inventory_count: Option<i64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.inventory_count.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        assert!(
            !ProductUpdate {
                inventory_count: Some(3),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn test_product_update_partial_deserialize() {
        let update: ProductUpdate = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        assert_eq!(update.price, Some(12.5));
        assert!(update.inventory_count.is_none());
        assert!(update.description.is_none());
        assert!(update.is_active.is_none());
    }
}
