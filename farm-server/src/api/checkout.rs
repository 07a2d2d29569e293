//! Stripe Checkout pass-through endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use shared::client::{CheckoutSessionRequest, CheckoutSessionResponse, CheckoutStatusResponse};
use shared::error::{AppError, ErrorCode};
use shared::models::OrderLineItem;

use super::ApiResult;
use crate::state::AppState;
use crate::stripe::{self, CheckoutItem};

/// Validate cart lines and convert dollar prices to cent amounts
fn to_checkout_items(lines: &[OrderLineItem]) -> Result<Vec<CheckoutItem>, AppError> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::validation("Quantities must be positive")
                .with_detail("item", line.name.clone()));
        }
        let price = line.price.ok_or_else(|| {
            AppError::validation("Each item needs a price").with_detail("item", line.name.clone())
        })?;
        if !(price > 0.0) {
            return Err(AppError::validation("Prices must be positive")
                .with_detail("item", line.name.clone()));
        }
        items.push(CheckoutItem {
            name: line.name.clone(),
            unit_amount: (price * 100.0).round() as i64,
            quantity: line.quantity,
        });
    }
    Ok(items)
}

/// POST /api/checkout/session
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CheckoutSessionRequest>,
) -> ApiResult<CheckoutSessionResponse> {
    if req.items.is_empty() {
        return Err(AppError::validation("Cart is empty"));
    }

    let items = to_checkout_items(&req.items)?;

    let (session_id, url) = stripe::create_checkout_session(
        &state.stripe_secret_key,
        &items,
        req.customer_email.as_deref(),
        &state.checkout_success_url,
        &state.checkout_cancel_url,
    )
    .await
    .map_err(|e| {
        tracing::error!("Stripe session creation failed: {e}");
        AppError::new(ErrorCode::PaymentSessionFailed)
    })?;

    Ok(Json(CheckoutSessionResponse { session_id, url }))
}

/// GET /api/checkout/session/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CheckoutStatusResponse> {
    let session = stripe::retrieve_session(&state.stripe_secret_key, &id)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %id, "Stripe session lookup failed: {e}");
            AppError::new(ErrorCode::PaymentSessionFailed)
        })?;

    Ok(Json(CheckoutStatusResponse {
        session_id: session.id,
        status: session.status,
        payment_status: session.payment_status,
        customer_email: session.customer_email,
    }))
}
