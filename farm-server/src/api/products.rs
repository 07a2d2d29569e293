//! Product catalog endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Product, ProductUpdate};

use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> ServiceResult<Json<Vec<Product>>> {
    let products = db::products::list_active(&state.pool).await?;
    Ok(Json(products))
}

/// GET /api/admin/products
pub async fn list_all_products(State(state): State<AppState>) -> ServiceResult<Json<Vec<Product>>> {
    let products = db::products::list_all(&state.pool).await?;
    Ok(Json(products))
}

fn validate_update(update: &ProductUpdate) -> Result<(), AppError> {
    if update.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }
    if update.inventory_count.is_some_and(|c| c < 0) {
        return Err(AppError::validation("inventory_count must be non-negative")
            .with_detail("field", "inventory_count"));
    }
    if update.price.is_some_and(|p| p < 0.0) {
        return Err(
            AppError::validation("price must be non-negative").with_detail("field", "price")
        );
    }
    Ok(())
}

/// PUT /api/admin/products/{id}
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<ProductUpdate>,
) -> ServiceResult<Json<Product>> {
    validate_update(&update)?;

    let now = shared::util::now_millis();
    let product = db::products::update(&state.pool, id, &update, now)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    Ok(Json(product))
}
